//! Frame codec
//!
//! WebSocket のテキストフレームとエンベロープ JSON の間の変換。
//! Hub とルーターは中身を知らず、接続ごとの Reader / Writer だけが使う。

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("invalid base64 frame: {0}")]
    InvalidBase64(String),

    #[error("frame is not valid UTF-8")]
    InvalidUtf8,

    #[error("unknown codec '{0}' (expected 'plain' or 'base64')")]
    UnknownCodec(String),
}

pub trait FrameCodec: Send + Sync {
    /// Outbound: envelope JSON -> wire text
    fn encode(&self, plain: &str) -> String;

    /// Inbound: wire text -> envelope JSON
    fn decode(&self, frame: &str) -> Result<String, CodecError>;
}

/// Identity codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextCodec;

impl FrameCodec for PlainTextCodec {
    fn encode(&self, plain: &str) -> String {
        plain.to_string()
    }

    fn decode(&self, frame: &str) -> Result<String, CodecError> {
        Ok(frame.to_string())
    }
}

/// Base64 armoring of the UTF-8 envelope.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Codec;

impl FrameCodec for Base64Codec {
    fn encode(&self, plain: &str) -> String {
        BASE64.encode(plain.as_bytes())
    }

    fn decode(&self, frame: &str) -> Result<String, CodecError> {
        let bytes = BASE64
            .decode(frame.trim())
            .map_err(|e| CodecError::InvalidBase64(e.to_string()))?;
        String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
    }
}

/// Codec selectable from the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CodecKind {
    #[default]
    Plain,
    Base64,
}

impl CodecKind {
    pub fn build(self) -> std::sync::Arc<dyn FrameCodec> {
        match self {
            CodecKind::Plain => std::sync::Arc::new(PlainTextCodec),
            CodecKind::Base64 => std::sync::Arc::new(Base64Codec),
        }
    }
}

impl FromStr for CodecKind {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "plain" => Ok(CodecKind::Plain),
            "base64" => Ok(CodecKind::Base64),
            other => Err(CodecError::UnknownCodec(other.to_string())),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Plain => f.write_str("plain"),
            CodecKind::Base64 => f.write_str("base64"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_codec_is_identity() {
        // テスト項目: PlainTextCodec は入力をそのまま返す
        // given (前提条件):
        let codec = PlainTextCodec;
        let envelope = r#"{"type":"heartbeat","payload":{}}"#;

        // when (操作):
        let encoded = codec.encode(envelope);

        // then (期待する結果):
        assert_eq!(encoded, envelope);
        assert_eq!(codec.decode(&encoded).unwrap(), envelope);
    }

    #[test]
    fn test_base64_codec_armors_envelope() {
        // テスト項目: Base64Codec はエンベロープを base64 で包み、元に戻せる
        // given (前提条件):
        let codec = Base64Codec;
        let envelope = r#"{"type":"room_list","payload":{}}"#;

        // when (操作):
        let encoded = codec.encode(envelope);

        // then (期待する結果):
        assert!(!encoded.contains('{'));
        assert_eq!(codec.decode(&encoded).unwrap(), envelope);
    }

    #[test]
    fn test_base64_codec_rejects_garbage() {
        // テスト項目: base64 でないフレームはエラーになる
        // given (前提条件):
        let codec = Base64Codec;

        // when (操作):
        let result = codec.decode("not base64!!");

        // then (期待する結果):
        assert!(matches!(result, Err(CodecError::InvalidBase64(_))));
    }

    #[test]
    fn test_base64_codec_rejects_non_utf8_payload() {
        // テスト項目: 復号結果が UTF-8 でなければエラーになる
        // given (前提条件):
        let codec = Base64Codec;
        let frame = BASE64.encode([0xff, 0xfe, 0xfd]);

        // when (操作):
        let result = codec.decode(&frame);

        // then (期待する結果):
        assert_eq!(result, Err(CodecError::InvalidUtf8));
    }

    #[test]
    fn test_codec_kind_parses_cli_values() {
        // テスト項目: コマンドライン引数からコーデックを選べる
        // given (前提条件):

        // when (操作):
        let plain = "plain".parse::<CodecKind>();
        let base64 = "BASE64".parse::<CodecKind>();
        let unknown = "aes".parse::<CodecKind>();

        // then (期待する結果):
        assert_eq!(plain, Ok(CodecKind::Plain));
        assert_eq!(base64, Ok(CodecKind::Base64));
        assert_eq!(unknown, Err(CodecError::UnknownCodec("aes".to_string())));
    }
}
