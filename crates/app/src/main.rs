//! Entry point for the GL sandbox.

use std::path::PathBuf;

use anyhow::Result;
use platform::RunConfig;

fn parse_size_args() -> (u32, u32) {
    let mut w: Option<u32> = None;
    let mut h: Option<u32> = None;

    for arg in std::env::args() {
        if let Some(v) = arg.strip_prefix("--size=") {
            if let Some((sw, sh)) = v.split_once('x').or_else(|| v.split_once('X')) {
                if let (Ok(pw), Ok(ph)) = (sw.parse::<u32>(), sh.parse::<u32>()) {
                    w = Some(pw);
                    h = Some(ph);
                }
            }
        } else if let Some(v) = arg.strip_prefix("--width=") {
            if let Ok(pw) = v.parse::<u32>() {
                w = Some(pw);
            }
        } else if let Some(v) = arg.strip_prefix("--height=") {
            if let Ok(ph) = v.parse::<u32>() {
                h = Some(ph);
            }
        }
    }

    let ww = w.unwrap_or(640).max(1);
    let hh = h.unwrap_or(480).max(1);
    (ww, hh)
}

fn parse_path_arg(prefix: &str) -> Option<PathBuf> {
    for arg in std::env::args() {
        if let Some(val) = arg.strip_prefix(prefix) {
            return Some(PathBuf::from(val));
        }
    }
    None
}

fn parse_switch(name: &str) -> bool {
    std::env::args().any(|arg| arg == name)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let (width, height) = parse_size_args();
    let model_path = parse_path_arg("--model=");
    let texture_path = parse_path_arg("--texture=");
    let mipmap = !parse_switch("--no-mipmap");
    let post_process = parse_switch("--post");
    let show_fps = parse_switch("--show-fps");

    log::info!(
        "Starting glsandbox. window={}x{}, model={:?}, texture={:?}, mipmap={}, post={}, show_fps={}",
        width,
        height,
        model_path,
        texture_path,
        mipmap,
        post_process,
        show_fps
    );

    platform::run(RunConfig {
        width,
        height,
        model_path,
        texture_path,
        mipmap,
        post_process,
        show_fps,
    })
}
