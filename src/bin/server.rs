use rootlens::config::Config;
use rootlens::server;

#[tokio::main]
async fn main() {
    env_logger::init();

    let config = Config::load();
    server::start(config).await;
}
