//! Prints the OpenAPI document served at `/openapi.json`.

use utoipa::OpenApi;

use universe_api::server::ApiDoc;

fn main() -> anyhow::Result<()> {
    let json = ApiDoc::openapi().to_pretty_json()?;
    println!("{}", json);
    Ok(())
}
