#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rates_compare_lib::run().await
}
