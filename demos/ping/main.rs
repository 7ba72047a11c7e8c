use raw_ping::{AttemptOutcome, AttemptRecord, Attempts, DnsResolver, GenericError, PingConfig, Resolve};
use std::time::Duration;

#[derive(argh::FromArgs)]
/// ping - send ICMP ECHO_REQUEST over a raw socket (needs root)
struct Args {
    #[argh(option, short = 'n', default = "4")]
    /// number of echo requests to send
    count: u32,

    #[argh(switch, short = 't')]
    /// ping until interrupted
    forever: bool,

    #[argh(option, short = 'i', default = "30")]
    /// time to live
    ttl: u32,

    #[argh(option, short = 'l', default = "32")]
    /// packet size in bytes
    size: usize,

    #[argh(option, short = 'w', default = "1000")]
    /// timeout in milliseconds to wait for each reply
    timeout: u64,

    #[argh(switch, short = 'v')]
    /// log packet flow
    verbose: bool,

    #[argh(positional)]
    /// host name or IPv4 address
    host: String,
}

fn print_record(record: &AttemptRecord) {
    match record.outcome {
        AttemptOutcome::TimedOut => println!("Request timed out for {}", record.destination.address),
        AttemptOutcome::Accepted => {
            let millis = record.rtt.unwrap_or_default().as_millis();
            let time = if millis == 0 { "<1".to_string() } else { format!("={millis}") };
            println!(
                "Reply from {}: bytes={} time{time}ms hops={} TTL={}",
                record.destination.address,
                record.packet_size,
                record.hops.unwrap_or_default(),
                record.ttl.map(|ttl| ttl.to_string()).unwrap_or_default(),
            );
        }
        outcome => println!("Reply from {}: {outcome}", record.destination.address),
    }
}

fn main() -> Result<(), GenericError> {
    let args: Args = argh::from_env();

    let level = if args.verbose { tracing::Level::TRACE } else { tracing::Level::WARN };
    let subscriber = tracing_subscriber::FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    let config = PingConfig {
        host: args.host,
        packet_size: args.size,
        ttl: args.ttl,
        attempts: if args.forever { Attempts::Unbounded } else { Attempts::Count(args.count) },
        timeout: Duration::from_millis(args.timeout),
    };
    config.validate()?;

    let destination = DnsResolver.resolve(&config.host)?;
    println!("\nPinging {} with {} bytes of data:\n", destination, raw_ping::frame_size(config.packet_size));

    let mut session = raw_ping::PingSession::create(&config, destination)?;
    let result = session.run_with(print_record)?;

    let records = result.all();
    if !records.is_empty() {
        let received = records.iter().filter(|r| r.outcome == AttemptOutcome::Accepted).count();
        println!(
            "\nPackets: Sent = {}, Received = {received}, Lost = {}",
            records.len(),
            records.len() - received
        );
    }
    Ok(())
}
