use crate::core::client::ApiClient;
use crate::core::errors::ApiError;
use crate::core::kernel::transport::Transport;
use crate::core::response::ApiResponse;
use std::iter::FusedIterator;

enum Cursor {
    Start,
    Next(String),
    Done,
}

/// Iterator over the pages of a listing
///
/// The first request goes to the given path with the given query; each
/// following request goes to the previous page's `nextPage` URL as-is.
/// Iteration ends when a page has no `nextPage`, or after the first error.
pub struct Pages<'a, T: Transport> {
    client: &'a ApiClient<T>,
    path: String,
    query: Vec<(String, String)>,
    cursor: Cursor,
}

impl<'a, T: Transport> Pages<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>, path: &str, query: &[(&str, &str)]) -> Self {
        Self {
            client,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            cursor: Cursor::Start,
        }
    }
}

impl<T: Transport> Iterator for Pages<'_, T> {
    type Item = Result<ApiResponse, ApiError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = match std::mem::replace(&mut self.cursor, Cursor::Done) {
            Cursor::Start => {
                let query: Vec<(&str, &str)> = self
                    .query
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                self.client.get(&self.path, &query)
            }
            Cursor::Next(url) => self.client.get(&url, &[]),
            Cursor::Done => return None,
        };

        if let Ok(page) = &result {
            if let Some(next) = page.next_page() {
                self.cursor = Cursor::Next(next.to_string());
            }
        }

        Some(result)
    }
}

impl<T: Transport> FusedIterator for Pages<'_, T> {}
