//! # 食物识别菜谱工具 — 终端入口
//!
//! 本文件只负责参数解析、设置装配与输入循环。
//! 工作流逻辑都在库里，详见 `lib.rs` 架构文档。
//!
//! 请求进行中仍会继续读取输入：`select!` 同时等待下一行命令与在途请求，
//! 此时的任何操作都会得到会话返回的"忙碌"提示。

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use recipe_lens::acquisition::{ImageAcquirer, ImageOrigin, PickedFile};
use recipe_lens::capture::FfmpegCamera;
use recipe_lens::error::AppError;
use recipe_lens::prediction::{HttpPredictionService, SubmissionOutcome};
use recipe_lens::session::{Mode, SessionController, Tab, UiEvent, ViewDescriptor, dispatch};
use recipe_lens::settings::AppSettings;
use recipe_lens::surface::render_view;

/// 拍照或选图，识别食物并显示菜谱。
#[derive(Debug, Parser)]
#[command(name = "recipe-lens", version, about)]
struct Args {
    /// 设置文件路径（默认 <config_dir>/recipe-lens/settings.json）
    #[arg(long)]
    settings: Option<PathBuf>,

    /// 预测接口地址
    #[arg(long)]
    endpoint: Option<String>,

    /// 相机设备节点
    #[arg(long)]
    device: Option<PathBuf>,

    /// 拍照后自动提交
    #[arg(long)]
    auto_submit: bool,

    /// 画质档位：quality / balanced / speed
    #[arg(long)]
    profile: Option<String>,
}

/// 终端命令。
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Event(UiEvent),
    Profile(String),
    Show,
    Json,
    Help,
    Quit,
}

const HELP: &str = "commands: upload | camera | pick <path> | snap | submit | profile <name> | show | json | help | quit";

fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb {
        "upload" => Ok(Command::Event(UiEvent::SwitchView(Tab::Upload))),
        "camera" => Ok(Command::Event(UiEvent::SwitchView(Tab::Camera))),
        "pick" if rest.is_empty() => Ok(Command::Event(UiEvent::FileAcquired(None))),
        "pick" => Ok(Command::Event(UiEvent::FileAcquired(Some(PickedFile::new(rest))))),
        "snap" => Ok(Command::Event(UiEvent::SnapshotRequested)),
        "submit" => Ok(Command::Event(UiEvent::SubmitRequested)),
        "profile" if !rest.is_empty() => Ok(Command::Profile(rest.to_string())),
        "show" | "" => Ok(Command::Show),
        "json" => Ok(Command::Json),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other}")),
    }
}

fn load_settings(args: &Args) -> Result<AppSettings, AppError> {
    let path = match &args.settings {
        Some(path) => path.clone(),
        None => AppSettings::default_path()?,
    };
    let mut settings = AppSettings::load(&path)?;

    if let Some(endpoint) = &args.endpoint {
        settings.prediction.endpoint = endpoint.clone();
    }
    if let Some(device) = &args.device {
        settings.camera.device = device.clone();
    }
    if let Some(profile) = &args.profile {
        settings.acquisition.profile = Some(profile.clone());
    }
    settings.auto_submit_snapshot |= args.auto_submit;

    settings.validate()?;
    Ok(settings)
}

fn print_view(view: &ViewDescriptor) {
    println!("{}", render_view(view));
}

type InFlight = Pin<Box<dyn Future<Output = SubmissionOutcome>>>;

async fn run(settings: AppSettings) -> Result<(), AppError> {
    let service = HttpPredictionService::new(&settings.prediction)?;
    let acquirer = ImageAcquirer::new(settings.acquisition.effective()?);
    let camera = FfmpegCamera::new(settings.camera.clone());
    let mut controller = SessionController::new(camera, service, acquirer);

    log::info!(
        "🚀 recipe-lens 已启动 - endpoint={} device={}",
        settings.prediction.endpoint,
        settings.camera.device.display()
    );
    println!("{HELP}");
    print_view(&controller.view());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight: Option<InFlight> = None;

    loop {
        let request = async {
            match in_flight.as_mut() {
                Some(request) => request.await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            outcome = request => {
                in_flight = None;
                print_view(&controller.finish_submit(outcome));
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(message) => {
                        println!("{message}\n{HELP}");
                        continue;
                    }
                };

                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::Show => print_view(&controller.view()),
                    Command::Json => match serde_json::to_string_pretty(&controller.view()) {
                        Ok(json) => println!("{json}"),
                        Err(e) => log::warn!("⚠️ 视图序列化失败：{}", e),
                    },
                    Command::Profile(name) => match controller.acquirer().set_profile(&name) {
                        Ok(()) => println!("profile: {name}"),
                        Err(e) => println!("{e}"),
                    },
                    Command::Event(UiEvent::SubmitRequested) => {
                        if let Ok(pending) = controller.begin_submit() {
                            let lifecycle = controller.lifecycle();
                            in_flight = Some(Box::pin(async move { lifecycle.run(pending).await }));
                        }
                        print_view(&controller.view());
                    }
                    Command::Event(event) => {
                        let snapshot = event == UiEvent::SnapshotRequested;
                        let view = dispatch(&mut controller, event).await;
                        print_view(&view);

                        let captured = view
                            .preview
                            .as_ref()
                            .is_some_and(|preview| preview.origin == ImageOrigin::Camera);
                        if snapshot
                            && settings.auto_submit_snapshot
                            && view.mode == Mode::Previewing
                            && captured
                            && let Ok(pending) = controller.begin_submit()
                        {
                            let lifecycle = controller.lifecycle();
                            in_flight = Some(Box::pin(async move { lifecycle.run(pending).await }));
                            print_view(&controller.view());
                        }
                    }
                }
            }
        }
    }

    if let Some(request) = in_flight.take() {
        log::info!("⏳ 等待在途请求完成后退出");
        print_view(&controller.finish_submit(request.await));
    }

    controller.shutdown();
    log::info!("👋 recipe-lens 已退出");
    Ok(())
}

fn main() -> Result<(), AppError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run(settings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_view_switches_and_pick() {
        assert_eq!(
            parse_command("camera"),
            Ok(Command::Event(UiEvent::SwitchView(Tab::Camera)))
        );
        assert_eq!(
            parse_command("pick  /tmp/food.png "),
            Ok(Command::Event(UiEvent::FileAcquired(Some(PickedFile::new("/tmp/food.png")))))
        );
        assert_eq!(parse_command("pick"), Ok(Command::Event(UiEvent::FileAcquired(None))));
    }

    #[test]
    fn parses_profile_and_rejects_unknown() {
        assert_eq!(parse_command("profile speed"), Ok(Command::Profile("speed".into())));
        assert!(parse_command("profile").is_err());
        assert!(parse_command("dance").is_err());
    }

    #[test]
    fn cli_overrides_settings() {
        let args = Args::parse_from([
            "recipe-lens",
            "--settings",
            "/nonexistent/recipe-lens/settings.json",
            "--endpoint",
            "http://192.168.1.20:5000/predict",
            "--auto-submit",
            "--profile",
            "quality",
        ]);

        let settings = load_settings(&args).expect("load settings");

        assert_eq!(settings.prediction.endpoint, "http://192.168.1.20:5000/predict");
        assert!(settings.auto_submit_snapshot);
        assert_eq!(settings.acquisition.effective().expect("effective").jpeg_quality, 95);
    }
}
