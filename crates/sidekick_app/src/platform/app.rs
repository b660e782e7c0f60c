use std::io;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use log::LevelFilter;
use sidekick_core::{update, AppState, Msg};
use sidekick_engine::{
    ChannelReplySink, CommandChannel, ConverterHandle, FfmpegTranscoder, OpenRouterClient,
    StatSampler, SysinfoSampler, WriterSink,
};
use sidekick_logging::{sidekick_debug, sidekick_info, sidekick_warn};

use super::config::load_config;
use super::effects::{EffectRunner, Flow};
use super::logging::{self, LogDestination};
use super::status::status_line;
use crate::cli::Cli;

pub fn run_app(cli: Cli) -> anyhow::Result<()> {
    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    logging::initialize(cli.log, level);
    if cli.log != LogDestination::Stderr {
        sidekick_debug!("Logging to {:?}", cli.log);
    }

    let config = load_config(cli.config.as_deref()).context("loading settings")?;
    let chat = OpenRouterClient::from_env(config.chat.clone()).context("configuring chat")?;
    let channel =
        CommandChannel::new(config.omnibox.clone(), Arc::new(chat)).context("starting channel")?;

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();

    let converter = ConverterHandle::new(Box::new(FfmpegTranscoder::new(&config.converter)));
    let host = WriterSink::new(io::stdout());
    let runner = EffectRunner::new(converter, Box::new(host), msg_tx.clone());

    // Queued ahead of the stdin thread so an immediate EOF cannot overtake them.
    for msg in startup_messages(&cli) {
        let _ = msg_tx.send(msg);
    }
    spawn_channel(channel, msg_tx.clone());
    spawn_stats_ticker(
        Box::new(SysinfoSampler::new()),
        config.stats_interval(),
        msg_tx.clone(),
    );
    drop(msg_tx);

    sidekick_info!("Sidekick ready");
    let mut state = AppState::new();
    while let Ok(msg) = msg_rx.recv() {
        let (next, effects) = update(state, msg);
        state = next;
        if state.consume_dirty() {
            sidekick_debug!("{}", status_line(&state.view()));
        }
        match runner.enqueue(effects) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Exit) => break,
            Err(err) => {
                sidekick_warn!("Host output closed: {}", err);
                break;
            }
        }
    }

    sidekick_info!("Sidekick shutting down");
    Ok(())
}

/// Work requested on the command line, handled as if it came from the user.
fn startup_messages(cli: &Cli) -> Vec<Msg> {
    let mut messages: Vec<Msg> = cli.convert.iter().cloned().map(Msg::FileDropped).collect();
    if cli.lua_bridge {
        messages.push(Msg::LuaBridgeFired);
    }
    messages
}

/// Serves stdin until end-of-stream, then reports the close.
fn spawn_channel(channel: CommandChannel, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let sink = ChannelReplySink::new(msg_tx.clone());
        if let Err(err) = channel.run(io::stdin().lock(), &sink) {
            sidekick_warn!("Input channel stopped: {}", err);
        }
        let _ = msg_tx.send(Msg::ChannelClosed);
    });
}

fn spawn_stats_ticker(
    mut sampler: Box<dyn StatSampler>,
    interval: Duration,
    msg_tx: mpsc::Sender<Msg>,
) {
    thread::spawn(move || loop {
        thread::sleep(interval);
        if msg_tx.send(Msg::StatsSampled(sampler.sample())).is_err() {
            break;
        }
    });
}
