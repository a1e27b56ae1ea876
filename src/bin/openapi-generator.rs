//! Print the JSON API's OpenAPI document, or write it to the path given as first argument.

use std::{env, fs};

use anyhow::Context;
use blind_timer::services::documentation::ApiDoc;
use utoipa::OpenApi;

fn main() -> anyhow::Result<()> {
    let document = ApiDoc::openapi()
        .to_pretty_json()
        .context("serializing OpenAPI document")?;

    match env::args().nth(1) {
        Some(path) => fs::write(&path, document).with_context(|| format!("writing {path}"))?,
        None => println!("{document}"),
    }
    Ok(())
}
