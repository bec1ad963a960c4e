use waypost::app::{run, ClientConfig};

fn main() {
    run(ClientConfig::default());
}
