use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use iambic_keyerd::{run_keyer, Cli, GpioLines, PaddlePoller, SoftTone, PADDLES, WAKE};
use keyer_core::{
    EmbeddedHalKeyOutput, EmbeddedHalPaddle, Keyer, KeyerConfig, KeyLine, OutputKey,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config = match cli.keyer_config() {
        Ok(config) => config,
        Err(err) => Cli::command().error(ErrorKind::ValueValidation, err).exit(),
    };

    match run(&cli, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(cli: &Cli) {
    let level = cli.log_level();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("iambic_keyerd={level},keyer_core={level},warn"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: &Cli, config: KeyerConfig) -> anyhow::Result<()> {
    let lines = GpioLines::open(&cli.hardware()).context("Hardware initialization failed")?;

    let mut key_out = EmbeddedHalKeyOutput::new(lines.key, false);
    key_out.set_state(false).context("Cannot release key line")?;

    let tone = match lines.tone {
        Some(pin) => SoftTone::spawn(pin).context("Cannot start sidetone")?,
        None => SoftTone::disabled(),
    };
    let mut key = KeyLine::new(key_out, tone, config.sidetone_hz);
    let keyer = Keyer::new(config);

    let poller = PaddlePoller::new(
        EmbeddedHalPaddle::new(lines.left),
        EmbeddedHalPaddle::new(lines.right),
        config.mode,
        cli.debounce_ms,
    );
    let stop = Arc::new(AtomicBool::new(false));

    info!(
        wpm = config.wpm,
        weight = config.weight,
        mode = ?config.mode,
        letter_space = config.letter_space,
        reversed = config.paddles_reversed,
        "Keyer ready, dot {} ms",
        keyer.timing().dot
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Cannot build runtime")?;

    let outcome = runtime.block_on(async {
        let poller_stop = Arc::clone(&stop);
        let mut poller =
            tokio::task::spawn_blocking(move || poller.run(&PADDLES, &WAKE, &poller_stop));

        let outcome = tokio::select! {
            result = run_keyer(keyer, &mut key) => {
                result.map(|never| match never {}).context("Key output failed")
            }
            joined = &mut poller => match joined {
                Ok(result) => result.context("Paddle input lost"),
                Err(err) => Err(err).context("Paddle poller panicked"),
            },
            signal = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                signal.context("Cannot listen for Ctrl-C")
            }
        };

        stop.store(true, Ordering::Release);
        if !poller.is_finished() {
            let _ = poller.await;
        }
        outcome
    });

    if let Err(err) = key.set_state(false) {
        warn!("Cannot release key line: {}", err);
    }

    outcome
}
