//! rfcollector - collect tag reads from an LLRP reader into CSV files

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use rfcollector::{
    cli::Cli,
    control::{self, InteractiveSource, UdpSource},
    CsvSink, JobDefinition, ReaderConfigDefinition, Session,
};
use rfcollector_transport::TcpTransport;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(e) => {
            error!("{:#}", e);
            1
        }
    };

    // A pending stdin read would otherwise hold up runtime shutdown
    std::process::exit(code);
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ReaderConfigDefinition::load(&cli.reader_config)
        .with_context(|| format!("loading reader configuration {}", cli.reader_config.display()))?;
    let job = JobDefinition::load(&cli.rospec)
        .with_context(|| format!("loading ROSpec {}", cli.rospec.display()))?;

    let sink = Arc::new(CsvSink::create(&cli.output_dir).context("creating output file")?);
    let session_config = cli.session_config();
    let transport = TcpTransport::new(cli.host.clone(), cli.port)
        .with_connect_timeout(session_config.connect_timeout());
    let session = Session::new(session_config, sink.clone(), None);
    let cancel = CancellationToken::new();

    // Everything that can fail happens before the reader is touched
    let udp = match cli.udp_port {
        Some(port) => {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
            let source = UdpSource::bind(session.clone(), addr, cancel.child_token())
                .await
                .with_context(|| format!("binding command port {port}"))?;
            Some(source)
        }
        None => None,
    };

    if let Err(e) = session.open(Box::new(transport), config, job).await {
        session.close().await;
        return Err(e).with_context(|| format!("opening session with {}:{}", cli.host, cli.port));
    }
    if let Some(reader) = session.reader_info() {
        info!("Connected: {}", reader);
    }

    let mut sources = JoinSet::new();
    if !cli.no_interactive {
        let source = InteractiveSource::new(
            session.clone(),
            BufReader::new(tokio::io::stdin()),
            cli.collection_duration(),
            cancel.child_token(),
        );
        sources.spawn(source.run());
    }
    if let Some(source) = udp {
        sources.spawn(source.run());
    }

    if sources.is_empty() {
        warn!("No command source enabled; waiting for Ctrl-C");
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        _ = control::drain(&mut sources), if !sources.is_empty() => info!("All command sources finished"),
    }

    control::shutdown(&session, &mut sources, &cancel).await;

    // Source tasks are joined, so this is the last sink handle besides the session's
    sink.flush().context("flushing output file")?;
    info!("{} tags written to {}", sink.rows(), sink.path().display());
    Ok(())
}

/// Setup logging from RUST_LOG, falling back to the verbosity flag
fn setup_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
