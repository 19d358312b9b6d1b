//! End-to-end exchange against mock STT, chat and TTS services

mod common;

use std::path::PathBuf;

use common::{MockServer, Route, chat_body, chat_line};
use companion::config::{ApiKeys, LlmConfig, SttConfig, TtsConfig};
use companion::persona::DEFAULT_PERSONA;
use companion::{
    Companion, Error, HistoryStore, OllamaClient, Role, SpeechToText, TextToSpeech,
};
use tempfile::TempDir;

const FAKE_MP3: &[u8] = b"ID3\x03\x00fake-mp3-bytes";

struct Fixture {
    dir: TempDir,
    recording: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let recording = dir.path().join("question.wav");
        std::fs::write(&recording, b"RIFF\x00\x00\x00\x00WAVEfmt ").unwrap();
        Self { dir, recording }
    }

    fn history_path(&self) -> PathBuf {
        self.dir.path().join("conversation.json")
    }

    fn audio_dir(&self) -> PathBuf {
        self.dir.path().join("audio")
    }

    fn companion(&self, server: &MockServer, with_tts: bool) -> Companion {
        let keys = ApiKeys::default();
        let chat = OllamaClient::new(&LlmConfig {
            base_url: server.base_url.clone(),
            timeout_secs: 5,
            ..LlmConfig::default()
        })
        .unwrap();
        let stt = SpeechToText::from_config(
            &SttConfig {
                base_url: Some(server.base_url.clone()),
                ..SttConfig::default()
            },
            &keys,
        )
        .unwrap();
        let tts = with_tts.then(|| {
            TextToSpeech::from_config(
                &TtsConfig {
                    base_url: Some(server.base_url.clone()),
                    ..TtsConfig::default()
                },
                &keys,
            )
            .unwrap()
        });

        Companion::new(
            HistoryStore::new(self.history_path()),
            chat,
            stt,
            tts,
            DEFAULT_PERSONA.to_string(),
            self.audio_dir(),
        )
    }
}

fn routes(transcript: &str, reply_lines: &[String], tts_status: u16) -> Vec<Route> {
    vec![
        Route::new(
            "/v1/audio/transcriptions",
            "application/json",
            serde_json::json!({ "text": transcript }).to_string(),
        ),
        Route::new("/api/chat", "application/x-ndjson", chat_body(reply_lines)),
        Route::new("/v1/audio/speech", "audio/mpeg", FAKE_MP3).status(tts_status),
    ]
}

#[tokio::test]
async fn test_full_exchange() {
    let fx = Fixture::new();
    let server = MockServer::start(routes(
        "  I had a hard day.  ",
        &[
            chat_line("That sounds hard. ", false),
            chat_line("Do you want to talk or take a break?", true),
        ],
        200,
    ))
    .await;
    let companion = fx.companion(&server, true);

    let exchange = companion.process_file(&fx.recording).await.unwrap();

    assert_eq!(exchange.transcript, "I had a hard day.");
    assert_eq!(
        exchange.reply,
        "That sounds hard. Do you want to talk or take a break?"
    );

    let audio = exchange.audio.expect("reply audio written");
    assert!(audio.starts_with(fx.audio_dir()));
    assert_eq!(std::fs::read(&audio).unwrap(), FAKE_MP3);

    let turns = companion.history().load();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].content(), "I had a hard day.");
    assert_eq!(turns[1].role(), Role::Assistant);

    let stt = &server.requests_to("/v1/audio/transcriptions")[0];
    assert!(
        stt.header("content-type")
            .is_some_and(|v| v.starts_with("multipart/form-data"))
    );
    assert!(stt.header("authorization").is_none());

    let tts = server.requests_to("/v1/audio/speech")[0].json();
    assert_eq!(tts["input"], exchange.reply.as_str());
    assert_eq!(tts["voice"], "alloy");
}

#[tokio::test]
async fn test_second_exchange_sends_prior_turns() {
    let fx = Fixture::new();
    let server = MockServer::start(routes("hello", &[chat_line("Hi.", true)], 200)).await;
    let companion = fx.companion(&server, false);

    companion.process_file(&fx.recording).await.unwrap();
    companion.process_file(&fx.recording).await.unwrap();

    let chats = server.requests_to("/api/chat");
    assert_eq!(chats.len(), 2);

    let first = chats[0].json();
    assert_eq!(first["messages"].as_array().unwrap().len(), 2);
    assert_eq!(first["messages"][0]["role"], "system");
    assert_eq!(first["messages"][0]["content"], DEFAULT_PERSONA);

    let second = chats[1].json();
    assert_eq!(
        second["messages"],
        serde_json::json!([
            { "role": "system", "content": DEFAULT_PERSONA },
            { "role": "user", "content": "hello" },
            { "role": "assistant", "content": "Hi." },
            { "role": "user", "content": "hello" },
        ])
    );

    let stats = companion.history().stats();
    assert_eq!(stats.exchange_count, 2);
    assert_eq!(stats.message_count, 4);
}

#[tokio::test]
async fn test_missing_audio_file() {
    let fx = Fixture::new();
    let server = MockServer::start(Vec::new()).await;
    let companion = fx.companion(&server, false);

    let missing = fx.dir.path().join("nope.wav");
    let err = companion.process_file(&missing).await.unwrap_err();

    assert!(matches!(err, Error::AudioNotFound(p) if p == missing));
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_empty_transcript_is_fatal_and_not_recorded() {
    let fx = Fixture::new();
    let server = MockServer::start(routes("   ", &[chat_line("unused", true)], 200)).await;
    let companion = fx.companion(&server, true);

    let err = companion.process_file(&fx.recording).await.unwrap_err();

    assert!(matches!(err, Error::EmptyTranscript));
    assert!(server.requests_to("/api/chat").is_empty());
    assert!(!fx.history_path().exists());
}

#[tokio::test]
async fn test_empty_reply_is_distinct_and_not_recorded() {
    let fx = Fixture::new();
    let server = MockServer::start(routes(
        "hi",
        &[chat_line("", false), chat_line("  ", true)],
        200,
    ))
    .await;
    let companion = fx.companion(&server, true);

    let err = companion.process_file(&fx.recording).await.unwrap_err();

    assert!(matches!(err, Error::EmptyReply));
    assert!(companion.history().load().is_empty());
    assert!(server.requests_to("/v1/audio/speech").is_empty());
}

#[tokio::test]
async fn test_tts_failure_still_delivers_reply() {
    let fx = Fixture::new();
    let server = MockServer::start(routes("hi", &[chat_line("Hello.", true)], 500)).await;
    let companion = fx.companion(&server, true);

    let exchange = companion.process_file(&fx.recording).await.unwrap();

    assert_eq!(exchange.reply, "Hello.");
    assert!(exchange.audio.is_none());
    assert_eq!(companion.history().load().len(), 2);
}

#[tokio::test]
async fn test_stt_error_propagates() {
    let fx = Fixture::new();
    let server = MockServer::start(vec![
        Route::new("/v1/audio/transcriptions", "application/json", r#"{"error":"bad audio"}"#)
            .status(400),
    ])
    .await;
    let companion = fx.companion(&server, false);

    let err = companion.process_file(&fx.recording).await.unwrap_err();

    assert!(matches!(err, Error::Stt(_)));
    assert!(!fx.history_path().exists());
}
