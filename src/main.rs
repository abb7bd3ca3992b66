use clap::Parser;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = mbw::Args::parse();
    if let Err(err) = mbw::run(&args) {
        log::error!("{err}");
        std::process::exit(1);
    }

    println!("Ok.");
}
