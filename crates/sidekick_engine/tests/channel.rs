use std::io::Cursor;
use std::sync::{mpsc, Arc, Mutex, Once};

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use sidekick_core::{OmniboxSettings, Reply, SuggestionEnvelope, SuggestionKind};
use sidekick_engine::{
    ChannelReplySink, ChannelStats, ChatBackend, ChatError, Clock, CommandChannel, WriterSink,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(sidekick_logging::initialize_for_tests);
}

#[derive(Default)]
struct ScriptedChat {
    questions: Mutex<Vec<String>>,
    fail: bool,
}

#[async_trait::async_trait]
impl ChatBackend for ScriptedChat {
    fn model_name(&self) -> &str {
        "Scripted"
    }

    async fn ask(&self, question: &str) -> Result<String, ChatError> {
        self.questions.lock().unwrap().push(question.to_string());
        if self.fail {
            Err(ChatError::Network("connection refused".to_string()))
        } else {
            Ok(format!("answer to {question}"))
        }
    }
}

fn fixed_clock() -> Clock {
    let now = NaiveDate::from_ymd_opt(2026, 3, 1)
        .and_then(|date| date.and_hms_opt(9, 30, 0))
        .unwrap();
    Arc::new(move || now)
}

fn channel_with(chat: Arc<ScriptedChat>) -> CommandChannel {
    CommandChannel::with_clock(OmniboxSettings::default(), chat, fixed_clock()).unwrap()
}

fn run_lines(chat: Arc<ScriptedChat>, input: &str) -> (Vec<String>, ChannelStats) {
    let channel = channel_with(chat);
    let sink = WriterSink::new(Vec::new());
    let stats = channel.run(Cursor::new(input.as_bytes()), &sink).unwrap();
    let output = String::from_utf8(sink.into_inner()).unwrap();
    (output.lines().map(str::to_string).collect(), stats)
}

fn parse_results(line: &str) -> SuggestionEnvelope {
    let json = line
        .strip_prefix("OMNIBOX_RESULTS: ")
        .expect("omnibox prefix");
    serde_json::from_str(json).unwrap()
}

#[test]
fn omnibox_query_produces_one_prefixed_line() {
    init_logging();
    let input = r#"{"type":"omnibox_query","query":{"query":"example.com","context":{"favorites":[],"history":[]}}}"#;
    let (lines, stats) = run_lines(Arc::default(), &format!("{input}\n"));

    assert_eq!(lines.len(), 1);
    let envelope = parse_results(&lines[0]);
    let kinds: Vec<_> = envelope.suggestions.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![SuggestionKind::Navigation, SuggestionKind::Search]);
    assert_eq!(envelope.suggestions[0].url, "http://example.com");
    assert_eq!(
        stats,
        ChannelStats {
            lines_read: 1,
            replies: 1,
            discarded: 0
        }
    );
}

#[test]
fn malformed_line_is_skipped_and_loop_continues() {
    init_logging();
    let input = concat!(
        "this is not json\n",
        "{\"type\":\"omnibox_query\",\"query\":\n",
        "\n",
        "{\"type\":\"omnibox_query\",\"query\":{\"query\":\"saat\"}}\n",
    );
    let (lines, stats) = run_lines(Arc::default(), input);

    assert_eq!(lines.len(), 1);
    let envelope = parse_results(&lines[0]);
    let info: Vec<_> = envelope
        .suggestions
        .iter()
        .filter(|s| s.kind == SuggestionKind::Info)
        .map(|s| s.title.as_str())
        .collect();
    assert_eq!(info, vec!["Time: 09:30:00", "Date: 2026-03-01"]);
    assert_eq!(stats.lines_read, 4);
    assert_eq!(stats.discarded, 2);
}

#[test]
fn invalid_utf8_is_just_a_bad_line() {
    init_logging();
    let mut input = vec![0xff, 0xfe, b'\n'];
    input.extend_from_slice(br#"{"type":"omnibox_query","query":"3+4"}"#);
    let channel = channel_with(Arc::default());
    let sink = WriterSink::new(Vec::new());
    let stats = channel.run(Cursor::new(input), &sink).unwrap();
    let output = String::from_utf8(sink.into_inner()).unwrap();

    assert_eq!(stats.replies, 1);
    let envelope = parse_results(output.trim_end());
    let calc = envelope
        .suggestions
        .iter()
        .find(|s| s.kind == SuggestionKind::Calculation)
        .unwrap();
    assert_eq!(calc.result, Some(7.0));
    assert!(output.contains(r#""result":7}"#));
}

#[test]
fn ask_commands_reach_the_chat_backend() {
    init_logging();
    let chat = Arc::new(ScriptedChat::default());
    let input = concat!(
        "{\"type\":\"query\",\"content\":\"ask what is a monad\"}\n",
        "{\"type\":\"query\",\"content\":\"Sor bugün hava nasıl\"}\n",
        "{\"type\":\"query\",\"content\":\"just chatting\"}\n",
    );
    let (lines, stats) = run_lines(chat.clone(), input);

    assert_eq!(
        lines,
        vec![
            r#"{"type":"ai_response","content":"answer to what is a monad"}"#.to_string(),
            r#"{"type":"ai_response","content":"answer to bugün hava nasıl"}"#.to_string(),
        ]
    );
    assert_eq!(
        *chat.questions.lock().unwrap(),
        vec!["what is a monad".to_string(), "bugün hava nasıl".to_string()]
    );
    assert_eq!(stats.discarded, 1);
}

#[test]
fn chat_failure_is_answered_with_text() {
    init_logging();
    let chat = Arc::new(ScriptedChat {
        fail: true,
        ..ScriptedChat::default()
    });
    let (lines, _) = run_lines(chat, "{\"type\":\"query\",\"content\":\"ask hi\"}\n");
    assert_eq!(
        lines,
        vec![
            r#"{"type":"ai_response","content":"Cloud Brain Error (Scripted): network error: connection refused"}"#
                .to_string()
        ]
    );
}

#[test]
fn unknown_types_are_ignored() {
    init_logging();
    let (lines, stats) = run_lines(
        Arc::default(),
        "{\"type\":\"ping\"}\n{\"type\":\"status\",\"content\":\"ask x\"}\n",
    );
    assert!(lines.is_empty());
    assert_eq!(stats.discarded, 2);
}

#[test]
fn empty_query_still_gets_an_empty_envelope() {
    init_logging();
    let (lines, _) = run_lines(
        Arc::default(),
        "{\"type\":\"omnibox_query\",\"query\":\"\",\"context\":{}}\n",
    );
    assert_eq!(lines, vec![r#"OMNIBOX_RESULTS: {"suggestions":[]}"#.to_string()]);
}

#[test]
fn channel_sink_forwards_to_receiver_in_order() {
    init_logging();
    let (tx, rx) = mpsc::channel::<Reply>();
    let channel = channel_with(Arc::default());
    let sink = ChannelReplySink::new(tx);
    let input = concat!(
        "{\"type\":\"omnibox_query\",\"query\":\"a\"}\n",
        "{\"type\":\"query\",\"content\":\"ask b\"}\n",
    );
    channel.run(Cursor::new(input), &sink).unwrap();
    drop(sink);

    let replies: Vec<Reply> = rx.iter().collect();
    assert_eq!(replies.len(), 2);
    assert!(matches!(replies[0], Reply::OmniboxResults(_)));
    assert_eq!(replies[1], Reply::AiResponse("answer to b".to_string()));
}

#[test]
fn dropped_receiver_stops_the_loop() {
    init_logging();
    let (tx, rx) = mpsc::channel::<Reply>();
    drop(rx);
    let channel = channel_with(Arc::default());
    let sink = ChannelReplySink::new(tx);
    let result = channel.run(
        Cursor::new("{\"type\":\"omnibox_query\",\"query\":\"a\"}\n"),
        &sink,
    );
    assert_eq!(
        result.unwrap_err().kind(),
        std::io::ErrorKind::BrokenPipe
    );
}
