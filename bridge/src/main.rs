mod host;
mod ir;
mod sensor;
mod store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    host::run().await
}
