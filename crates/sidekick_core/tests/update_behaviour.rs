use std::path::PathBuf;
use std::sync::Once;

use sidekick_core::{update, AppState, Effect, Msg, Reply, SystemStats, LUA_BRIDGE_SCRIPT};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sidekick_logging::initialize_for_tests);
}

fn drop_file(state: AppState, path: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::FileDropped(PathBuf::from(path)))
}

#[test]
fn stats_sample_updates_gauges_and_marks_dirty() {
    init_logging();
    let stats = SystemStats {
        cpu: 12.5,
        memory: 48.0,
        disk: 71.25,
    };
    let (mut state, effects) = update(AppState::new(), Msg::StatsSampled(stats));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.cpu_percent, 12.5);
    assert_eq!(view.memory_percent, 48.0);
    assert_eq!(view.disk_percent, 71.25);
    assert!(state.consume_dirty());

    let (mut state, _) = update(state, Msg::StatsSampled(stats));
    assert!(!state.consume_dirty());
}

#[test]
fn first_drop_starts_conversion() {
    init_logging();
    let (state, effects) = drop_file(AppState::new(), "/videos/clip.mp4");
    assert_eq!(
        effects,
        vec![Effect::StartConversion {
            path: PathBuf::from("/videos/clip.mp4")
        }]
    );
    assert!(state.is_converting());
    assert_eq!(state.view().queued_conversions, 0);
}

#[test]
fn drop_while_busy_is_queued_then_started_in_order() {
    init_logging();
    let (state, _) = drop_file(AppState::new(), "/a.mp4");
    let (state, effects) = drop_file(state, "/b.mov");
    assert_eq!(
        effects,
        vec![Effect::Emit(Reply::Status("Queued: b.mov".to_string()))]
    );
    let (state, effects) = drop_file(state, "/c.mkv");
    assert_eq!(effects.len(), 1);
    assert_eq!(state.view().queued_conversions, 2);

    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/a.mp4"),
            succeeded: true,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartConversion {
            path: PathBuf::from("/b.mov")
        }]
    );
    assert_eq!(state.view().active_conversion, Some(PathBuf::from("/b.mov")));
    assert_eq!(state.view().queued_conversions, 1);

    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/b.mov"),
            succeeded: false,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartConversion {
            path: PathBuf::from("/c.mkv")
        }]
    );

    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/c.mkv"),
            succeeded: true,
        },
    );
    assert!(effects.is_empty());
    assert!(!state.is_converting());
}

#[test]
fn stale_finish_is_ignored() {
    init_logging();
    let (state, _) = drop_file(AppState::new(), "/a.mp4");
    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/other.mp4"),
            succeeded: true,
        },
    );
    assert!(effects.is_empty());
    assert!(state.is_converting());
}

#[test]
fn progress_is_shown_and_forwarded() {
    init_logging();
    let (state, _) = drop_file(AppState::new(), "/a.mp4");
    let (state, effects) = update(
        state,
        Msg::ConversionProgress("MP4 -> MP3: extracting audio".to_string()),
    );
    assert_eq!(
        effects,
        vec![Effect::Emit(Reply::Status(
            "MP4 -> MP3: extracting audio".to_string()
        ))]
    );
    assert_eq!(
        state.view().conversion_status.as_deref(),
        Some("MP4 -> MP3: extracting audio")
    );
    assert_eq!(state.view().replies_sent, 1);
}

#[test]
fn lua_bridge_emits_script() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::LuaBridgeFired);
    assert_eq!(
        effects,
        vec![Effect::Emit(Reply::Lua(LUA_BRIDGE_SCRIPT.to_string()))]
    );
    assert_eq!(state.view().replies_sent, 1);
}

#[test]
fn channel_replies_pass_through() {
    init_logging();
    let reply = Reply::AiResponse("hello".to_string());
    let (_, effects) = update(AppState::new(), Msg::ChannelReply(reply.clone()));
    assert_eq!(effects, vec![Effect::Emit(reply)]);
}

#[test]
fn channel_close_shuts_down_when_idle() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::ChannelClosed);
    assert_eq!(effects, vec![Effect::Shutdown]);
    assert!(!state.view().channel_open);
}

#[test]
fn channel_close_waits_for_running_conversions() {
    init_logging();
    let (state, _) = drop_file(AppState::new(), "/a.mp4");
    let (state, _) = drop_file(state, "/b.mp4");
    let (state, effects) = update(state, Msg::ChannelClosed);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/a.mp4"),
            succeeded: true,
        },
    );
    assert_eq!(
        effects,
        vec![Effect::StartConversion {
            path: PathBuf::from("/b.mp4")
        }]
    );

    let (_, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/b.mp4"),
            succeeded: true,
        },
    );
    assert_eq!(effects, vec![Effect::Shutdown]);
}

#[test]
fn work_queued_before_input_closes_is_still_done() {
    init_logging();
    let (state, mut effects) = drop_file(AppState::new(), "/startup/clip.mp4");
    let (state, more) = update(state, Msg::LuaBridgeFired);
    effects.extend(more);
    let (state, more) = update(state, Msg::ChannelClosed);
    effects.extend(more);

    assert_eq!(
        effects,
        vec![
            Effect::StartConversion {
                path: PathBuf::from("/startup/clip.mp4")
            },
            Effect::Emit(Reply::Lua(LUA_BRIDGE_SCRIPT.to_string())),
        ]
    );
    assert!(state.is_converting());

    let (_, effects) = update(
        state,
        Msg::ConversionFinished {
            path: PathBuf::from("/startup/clip.mp4"),
            succeeded: false,
        },
    );
    assert_eq!(effects, vec![Effect::Shutdown]);
}
