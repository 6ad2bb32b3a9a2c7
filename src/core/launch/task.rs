// ─── Launch Task ───
// Renders a descriptor into a Java command line and spawns it.

use std::path::{Path, PathBuf};
use std::process::{Child, Command};

use tracing::info;

use super::classpath::{build_classpath, safe_path_str, LaunchPlan};
use crate::core::config::LaunchDescriptor;
use crate::core::error::{LauncherError, LauncherResult};

/// A fully rendered runtime invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl LaunchCommand {
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }

    /// Copy/paste-able rendering for logs and dry runs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.to_string_lossy().to_string())
            .chain(self.args.iter().cloned())
            .map(|part| shell_escape(&part))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Order: heap size, splash, library path, system properties, jvm-args,
/// then `-jar` or `-cp MAIN`, then application arguments.
pub fn build_command(
    desc: &LaunchDescriptor,
    plan: &LaunchPlan,
    java_bin: &Path,
) -> LauncherResult<LaunchCommand> {
    let mut args = Vec::new();

    if desc.heap_size > 0 {
        args.push(format!("-Xmx{}m", desc.heap_size));
    }
    if let Some(splash) = &plan.splash_image {
        args.push(format!("-splash:{}", safe_path_str(splash)));
    }
    if let Some(natives) = &plan.natives_dir {
        args.push(format!("-Djava.library.path={}", safe_path_str(natives)));
    }
    for (name, value) in &desc.sysprops {
        args.push(format!("-D{}={}", name, value));
    }
    args.extend(desc.jvm_args.iter().cloned());

    match (&plan.exec_jar, &desc.main_class) {
        (Some(jar), _) => {
            args.push("-jar".to_string());
            args.push(safe_path_str(jar));
        }
        (None, Some(main_class)) => {
            if !plan.classpath.is_empty() {
                args.push("-cp".to_string());
                args.push(build_classpath(&plan.classpath));
            }
            args.push(main_class.clone());
        }
        (None, None) => return Err(LauncherError::NothingToLaunch),
    }

    args.extend(desc.cmd_args.iter().cloned());

    Ok(LaunchCommand {
        program: java_bin.to_path_buf(),
        args,
    })
}

/// Spawn the runtime. Returns as soon as the child is running.
pub fn spawn(desc: &LaunchDescriptor, command: &LaunchCommand) -> LauncherResult<Child> {
    let mut cmd = command.to_command();
    configure_platform_spawn(&mut cmd);

    if let Some(title) = &desc.title {
        info!("Launching {}", title);
    }
    info!("Command (copy/paste): {}", command.display());

    cmd.spawn()
        .map_err(|e| LauncherError::JavaExecution(format!("{}: {}", command.program.display(), e)))
}

fn configure_platform_spawn(cmd: &mut Command) {
    #[cfg(target_os = "windows")]
    {
        use std::os::windows::process::CommandExt;
        const CREATE_NO_WINDOW: u32 = 0x08000000;
        cmd.creation_flags(CREATE_NO_WINDOW);
    }
    #[cfg(not(target_os = "windows"))]
    let _ = cmd;
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=' | '+' | ',')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
