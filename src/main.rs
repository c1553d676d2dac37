use anyhow::{bail, Context};
use restlink::core::config::EnvSource;
use restlink::{ApiClient, CredentialPair};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    // Usage: restlink <resource-path> [key=value ...]
    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: restlink <resource-path> [key=value ...]");
    };
    let params: Vec<(String, String)> = args
        .map(|arg| {
            arg.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("query parameter '{}' is not key=value", arg))
        })
        .collect::<Result<_, _>>()?;
    let query: Vec<(&str, &str)> = params
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();

    #[cfg(feature = "env-file")]
    restlink::core::config::load_env_file(".env")?;

    let credentials = CredentialPair::from_env().context("loading tenant credentials")?;
    let client =
        ApiClient::from_source(&EnvSource, credentials).context("loading endpoint configuration")?;

    let session = client.connect()?;
    if !session.is_success() {
        bail!(
            "connection refused: {} {}",
            session.status_code(),
            session.reason_phrase()
        );
    }

    for (number, page) in client.pages(&path, &query).enumerate() {
        let page = page?;
        println!("--- page {} ---", number + 1);
        println!("{}", page);
    }

    Ok(())
}
