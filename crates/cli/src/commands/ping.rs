use memobase_client::MemobaseClient;

pub async fn run(client: &MemobaseClient) -> anyhow::Result<()> {
    if client.ping().await {
        println!("Memobase is reachable at {}.", client.base_url());
        Ok(())
    } else {
        eprintln!("Memobase is not reachable at {}.", client.base_url());
        std::process::exit(1);
    }
}
