//! # Logging モジュール
//!
//! シミュレーションのログ出力設定を提供します。
//!
//! tracing-subscriberによる構造化ログをコンソールとファイルへ出力できます。
//! ファイル出力はtracing-appenderの非同期書き込みを使用するため、
//! シミュレーション本体の処理速度に影響を与えません。
//!
//! ## 出力先
//!
//! - `Console`: コンソールのみ（コンパクト形式）
//! - `File`: ファイルのみ（logs/robosim.log、JSON形式・日次ローテーション）
//! - `Both`: コンソールとファイルの両方

use std::str::FromStr;

use tracing::Level;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{
    fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry,
};

/// ログ出力先の設定
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    /// コンソールのみ
    Console,
    /// ファイルのみ
    File,
    /// コンソールとファイルの両方
    Both,
}

impl FromStr for LogOutput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stdout" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(format!(
                "無効な出力先: {}. 利用可能: console, file, both",
                s
            )),
        }
    }
}

/// ログ設定構造体
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// ログレベル
    pub level: Level,
    /// 出力先
    pub output: LogOutput,
    /// ログファイルのディレクトリ
    pub log_dir: String,
    /// ログファイル名のプレフィックス
    pub file_prefix: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            output: LogOutput::Console,
            log_dir: "logs".to_string(),
            file_prefix: "robosim".to_string(),
        }
    }
}

/// ログシステムを初期化
///
/// 設定に基づいてtracing-subscriberを構成します。ファイル出力が指定されて
/// いる場合はログディレクトリを作成し、非同期書き込みを有効化します。
/// プロセス内で一度だけ呼び出してください。
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    // 環境変数が設定されていればそちらを優先
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.level.to_string()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.output != LogOutput::Console {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    match config.output {
        LogOutput::Console => {
            Registry::default()
                .with(env_filter)
                .with(console_layer())
                .init();
        }
        LogOutput::File => {
            let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
            let (writer, guard) = non_blocking(file_appender);

            Registry::default()
                .with(env_filter)
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(true)
                        .with_file(false)
                        .with_line_number(false)
                        .json(),
                )
                .init();

            // guardをリークさせてプロセス終了まで非同期書き込みを維持
            std::mem::forget(guard);
        }
        LogOutput::Both => {
            let file_appender = rolling::daily(&config.log_dir, &config.file_prefix);
            let (writer, guard) = non_blocking(file_appender);

            Registry::default()
                .with(env_filter)
                .with(console_layer())
                .with(
                    fmt::layer()
                        .with_writer(writer)
                        .with_target(true)
                        .with_file(false)
                        .with_line_number(false)
                        .json(),
                )
                .init();

            std::mem::forget(guard);
        }
    }

    Ok(())
}

fn console_layer<S>() -> impl tracing_subscriber::Layer<S>
where
    S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fmt::layer()
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
}

/// ログレベルを文字列から解析
///
/// 無効な文字列の場合は警告を表示してINFOを返します。
pub fn parse_log_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!("警告: 無効なログレベル '{}'. INFOを使用します", level_str);
            Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_output_from_str() {
        assert_eq!(LogOutput::from_str("console"), Ok(LogOutput::Console));
        assert_eq!(LogOutput::from_str("FILE"), Ok(LogOutput::File));
        assert_eq!(LogOutput::from_str("both"), Ok(LogOutput::Both));
        assert!(LogOutput::from_str("invalid").is_err());
    }

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("trace"), Level::TRACE);
        assert_eq!(parse_log_level("WARN"), Level::WARN);
        assert_eq!(parse_log_level("invalid"), Level::INFO);
    }

    #[test]
    fn test_default_config() {
        let config = LogConfig::default();
        assert_eq!(config.output, LogOutput::Console);
        assert_eq!(config.file_prefix, "robosim");
    }
}
