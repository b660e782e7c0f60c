use std::path::Path;

use sidekick_logging::{sidekick_debug, sidekick_info};

use crate::{AppState, Effect, Msg, Reply, LUA_BRIDGE_SCRIPT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::StatsSampled(stats) => {
            state.set_stats(stats);
            Vec::new()
        }
        Msg::FileDropped(path) => {
            // One conversion at a time; later drops wait their turn.
            match state.admit_conversion(path.clone()) {
                Some(path) => vec![Effect::StartConversion { path }],
                None => {
                    let status = format!("Queued: {}", display_name(&path));
                    state.set_conversion_status(status.clone());
                    vec![emit(&mut state, Reply::Status(status))]
                }
            }
        }
        Msg::ConversionProgress(text) => {
            state.set_conversion_status(text.clone());
            vec![emit(&mut state, Reply::Status(text))]
        }
        Msg::ConversionFinished { path, succeeded } => {
            sidekick_debug!("conversion of {:?} finished, succeeded={}", path, succeeded);
            match state.finish_conversion(&path) {
                Some(next) => vec![Effect::StartConversion { path: next }],
                None if should_shut_down(&state) => vec![Effect::Shutdown],
                None => Vec::new(),
            }
        }
        Msg::LuaBridgeFired => vec![emit(&mut state, Reply::Lua(LUA_BRIDGE_SCRIPT.to_string()))],
        Msg::ChannelReply(reply) => vec![emit(&mut state, reply)],
        Msg::ChannelClosed => {
            state.close_channel();
            if should_shut_down(&state) {
                vec![Effect::Shutdown]
            } else {
                sidekick_info!("input closed; waiting for conversions to finish");
                Vec::new()
            }
        }
    };

    (state, effects)
}

fn emit(state: &mut AppState, reply: Reply) -> Effect {
    state.record_reply();
    Effect::Emit(reply)
}

fn should_shut_down(state: &AppState) -> bool {
    !state.channel_open() && !state.is_converting()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
