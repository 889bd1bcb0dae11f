//! 声音渠道 - 调用系统播放器播放提示音
//!
//! 声音文件查找顺序：自定义路径（存在时）-> `<sounds_dir>/<event>.wav` -> 不播放。
//! Linux 上按顺序尝试 paplay、aplay、mpv、ffplay，第一个成功即停止。

use super::run_quiet;
use crate::notification::channel::{SendResult, SoundSink};
use crate::notification::event::EventKind;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// 一个候选播放器
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub command: String,
    pub args: Vec<String>,
}

impl Player {
    fn new(command: &str, args: &[&str], sound: &Path) -> Self {
        let mut args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
        args.push(sound.to_string_lossy().into_owned());
        Self {
            command: command.to_string(),
            args,
        }
    }
}

/// Windows 上用 PowerShell 同步播放
const WINDOWS_PLAY_SCRIPT: &str = "& { (New-Object Media.SoundPlayer $args[0]).PlaySync() }";

/// 当前平台的播放器列表
pub fn players_for(sound: &Path) -> Vec<Player> {
    if cfg!(target_os = "macos") {
        vec![Player::new("afplay", &[], sound)]
    } else if cfg!(target_os = "windows") {
        vec![Player::new("powershell", &["-c", WINDOWS_PLAY_SCRIPT], sound)]
    } else if cfg!(unix) {
        linux_players(sound)
    } else {
        Vec::new()
    }
}

fn linux_players(sound: &Path) -> Vec<Player> {
    vec![
        Player::new("paplay", &[], sound),
        Player::new("aplay", &[], sound),
        Player::new("mpv", &["--no-video", "--no-terminal"], sound),
        Player::new("ffplay", &["-nodisp", "-autoexit", "-loglevel", "quiet"], sound),
    ]
}

/// 依次尝试播放器，第一个成功退出的即为结果
///
/// 不在 PATH 中的播放器直接跳过；全部失败返回 `Failed`。
pub async fn play_with_fallback(players: &[Player]) -> SendResult {
    for player in players {
        if which::which(&player.command).is_err() {
            debug!(player = %player.command, "Player not installed, skipping");
            continue;
        }

        match run_quiet(&player.command, &player.args).await {
            Ok(()) => {
                debug!(player = %player.command, "Sound played");
                return SendResult::Sent;
            }
            Err(e) => {
                debug!(player = %player.command, error = %e, "Player failed, trying next");
            }
        }
    }

    SendResult::Failed("no audio player succeeded".to_string())
}

/// 默认内置声音目录：可执行文件旁的 `sounds/`，其次是数据目录
pub fn default_sounds_dir() -> PathBuf {
    let beside_exe = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("sounds")));

    match beside_exe {
        Some(dir) if dir.is_dir() => dir,
        _ => dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agent-notifier")
            .join("sounds"),
    }
}

/// 通过系统播放器播放声音
#[derive(Debug, Clone)]
pub struct PlayerSoundSink {
    sounds_dir: PathBuf,
}

impl PlayerSoundSink {
    pub fn new(sounds_dir: impl Into<PathBuf>) -> Self {
        Self {
            sounds_dir: sounds_dir.into(),
        }
    }

    /// 查找要播放的文件
    pub fn resolve_sound_file(&self, kind: EventKind, custom_path: Option<&Path>) -> Option<PathBuf> {
        if let Some(custom) = custom_path {
            if custom.exists() {
                return Some(custom.to_path_buf());
            }
            debug!(path = %custom.display(), "Custom sound not found, falling back to bundled sound");
        }

        let bundled = self.sounds_dir.join(format!("{}.wav", kind));
        if bundled.exists() {
            Some(bundled)
        } else {
            None
        }
    }
}

#[async_trait]
impl SoundSink for PlayerSoundSink {
    fn name(&self) -> &str {
        "player"
    }

    async fn play(&self, kind: EventKind, custom_path: Option<&Path>) -> Result<SendResult> {
        let Some(sound) = self.resolve_sound_file(kind, custom_path) else {
            return Ok(SendResult::Skipped(format!("no sound file for {}", kind)));
        };

        let players = players_for(&sound);
        if players.is_empty() {
            return Ok(SendResult::Skipped("unsupported platform".to_string()));
        }

        Ok(play_with_fallback(&players).await)
    }
}
