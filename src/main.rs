use anyhow::Context;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    docgen_server::run()
        .await
        .context("document generation server stopped with an error")
}
