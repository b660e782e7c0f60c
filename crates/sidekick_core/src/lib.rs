//! Sidekick core: suggestion engine, wire protocol and the pure app state machine.
mod calc;
mod context;
mod effect;
mod msg;
mod omnibox;
mod protocol;
mod settings;
mod state;
mod suggestion;
mod update;
mod view_model;

pub use calc::{evaluate, CalcError};
pub use context::{LinkEntry, OmniboxContext, OmniboxRequest};
pub use effect::Effect;
pub use msg::Msg;
pub use omnibox::{is_calculation_candidate, suggest};
pub use protocol::{
    ask_command, parse_line, Inbound, ProtocolError, Reply, LUA_BRIDGE_SCRIPT, LUA_PREFIX,
    OMNIBOX_PREFIX, STATUS_PREFIX,
};
pub use settings::{AiFallback, InternalShortcut, OmniboxSettings, SearchEngine};
pub use state::{AppState, SystemStats};
pub use suggestion::{format_number, Icon, Suggestion, SuggestionEnvelope, SuggestionKind};
pub use update::update;
pub use view_model::AppViewModel;
