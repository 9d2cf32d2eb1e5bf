use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use dns_client::client::{lookup, Lookup, LookupOptions};
use dns_client::dns_question_and_answer::{ClassName, TypeName};
use dns_client::{RecordClass, RecordType};

#[derive(Parser, Debug)]
#[command(name = "dns-client", about = "Send one DNS query and print the decoded response")]
struct Args {
    /// Resolver to query (e.g., 8.8.8.8)
    nameserver: IpAddr,

    /// Name to look up (e.g., example.com)
    host: String,

    /// Resolver port
    #[arg(long, default_value_t = 53)]
    port: u16,

    /// Seconds to wait for the reply
    #[arg(short, long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    timeout: u64,

    /// Transaction id placed in the query header
    #[arg(long, default_value_t = 1)]
    id: u16,

    /// Record type to ask for, as a mnemonic or number
    #[arg(long, default_value = "A", value_parser = parse_qtype)]
    qtype: u16,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value_t = Level::WARN)]
    log_level: Level,
}

fn parse_qtype(value: &str) -> Result<u16, String> {
    RecordType::parse(value).ok_or_else(|| format!("unknown record type {:?}", value))
}

fn init_logging(level: Level) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    let resolver = SocketAddr::new(args.nameserver, args.port);
    let options = LookupOptions {
        id: args.id,
        qtype: args.qtype,
        qclass: RecordClass::IN.to_u16(),
        timeout: Duration::from_secs(args.timeout),
    };

    let lookup = lookup(resolver, &args.host, &options)
        .with_context(|| format!("lookup of {} via {} failed", args.host, resolver))?;

    print_lookup(&lookup);

    Ok(())
}

fn print_lookup(lookup: &Lookup) {
    let response = &lookup.response;
    let header = &response.header;
    let flags = header.flags();

    println!("Got {} bytes from {}", lookup.size, lookup.source);

    println!("Header:");
    println!("\tmessage_id: {}", header.id);
    println!("\tflags:");
    println!("\t\tqr: {}", u8::from(flags.qr));
    println!("\t\topcode: {}", flags.opcode);
    println!("\t\taa: {}", u8::from(flags.aa));
    println!("\t\ttc: {}", u8::from(flags.tc));
    println!("\t\trd: {}", u8::from(flags.rd));
    println!("\t\tra: {}", u8::from(flags.ra));
    println!("\t\tz: {}", flags.z);
    println!("\t\trcode: {}", flags.rcode);
    println!("\tqd_count: {}", header.question_count);
    println!("\tan_count: {}", header.answer_count);
    println!("\tns_count: {}", header.authority_count);
    println!("\tar_count: {}", header.additional_count);

    for question in &response.questions {
        println!("Question:");
        println!("\tqname: {}", question.name);
        println!("\tqtype: {}", TypeName(question.qtype));
        println!("\tqclass: {}", ClassName(question.qclass));
    }

    for answer in &response.answers {
        println!("Answer:");
        println!("\tname: {}", answer.name);
        println!("\ttype: {}", TypeName(answer.rtype));
        println!("\tclass: {}", ClassName(answer.rclass));
        println!("\tttl (seconds): {}", answer.ttl);
        println!("\trd_length: {}", answer.rdlength());
        if let Some(ip) = answer.ipv4() {
            println!("\tip: {}", ip);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["dns-client", "8.8.8.8", "example.com"]).unwrap();
        assert_eq!(args.port, 53);
        assert_eq!(args.timeout, 5);
        assert_eq!(args.id, 1);
        assert_eq!(args.qtype, 1);
        assert_eq!(args.log_level, Level::WARN);
    }

    #[test]
    fn test_args_reject_zero_timeout() {
        let result = Args::try_parse_from(["dns-client", "--timeout", "0", "8.8.8.8", "example.com"]);
        assert!(result.is_err());

        let args =
            Args::try_parse_from(["dns-client", "-t", "1", "--qtype", "aaaa", "::1", "example.com"])
                .unwrap();
        assert_eq!(args.timeout, 1);
        assert_eq!(args.qtype, 28);
    }
}
