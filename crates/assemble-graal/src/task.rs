//! The task that runs the native image compiler

use assemble_graal_core::exception::{BuildException, BuildResult};
use assemble_graal_core::lazy_evaluation;
use assemble_graal_core::lazy_evaluation::{Prop, Provider, VecProp};
use assemble_graal_core::task::{Executable, Task};
use assemble_graal_core::Project;
use log::{debug, info, log, trace, Level};
use std::env::{join_paths, JoinPathsError};
use std::ffi::OsString;
use std::io;
use std::io::{BufRead, BufReader, ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;

use crate::resolver::NativeImageDescriptor;

/// The name of the native image compiler executable
pub const NATIVE_IMAGE_EXECUTABLE: &str = if cfg!(windows) {
    "native-image.cmd"
} else {
    "native-image"
};

/// Builds a native image out of compiled classes by running the `native-image` executable.
#[derive(Debug)]
pub struct NativeImage {
    /// The class containing the entry point of the image
    pub main: Prop<String>,
    /// The name of the produced executable
    pub image_name: Prop<String>,
    /// Classes, resources and jars the image is built from
    pub classpath: VecProp<PathBuf>,
    /// Overrides where the `native-image` executable is found
    pub executable: Prop<PathBuf>,
    /// Extra arguments passed to the compiler, after the generated ones
    pub args: VecProp<String>,
    /// The directory the compiler runs in, and where the image ends up
    pub working_dir: Prop<PathBuf>,
}

impl Default for NativeImage {
    fn default() -> Self {
        Self {
            main: Prop::with_name("main"),
            image_name: Prop::with_name("imageName"),
            classpath: VecProp::with_name("classpath"),
            executable: Prop::with_name("executable"),
            args: VecProp::with_name("args"),
            working_dir: Prop::with_name("workingDir"),
        }
    }
}

impl NativeImage {
    /// Configures a task from a descriptor. The image name is only set if the task doesn't
    /// already have one.
    pub fn apply_descriptor(
        task: &mut Executable<Self>,
        descriptor: &NativeImageDescriptor,
    ) -> Result<(), lazy_evaluation::Error> {
        task.set_enabled(descriptor.enabled);
        match &descriptor.entry_point_class {
            Some(main) => task.main.set(main.clone())?,
            None => task.main.clear()?,
        }
        if !task.image_name.try_get().map_or(false, |name| !name.is_empty()) {
            task.image_name.set(descriptor.image_name.clone())?;
        }
        task.classpath.set(descriptor.classpath.iter().cloned())?;
        Ok(())
    }

    /// The descriptor this task currently builds
    pub fn descriptor(task: &Executable<Self>) -> NativeImageDescriptor {
        NativeImageDescriptor {
            enabled: task.enabled(),
            entry_point_class: task.main.try_get(),
            image_name: task.image_name.try_get().unwrap_or_default(),
            classpath: task.classpath.try_get().unwrap_or_default(),
        }
    }

    /// The arguments passed to the compiler:
    ///
    /// `-cp <classpath> -H:Name=<image name> -H:Class=<main> <args...>`
    pub fn command_line(&self) -> Result<Vec<OsString>, NativeImageError> {
        let main = self.main.try_get().ok_or(NativeImageError::MissingMainClass)?;
        let image_name = self
            .image_name
            .try_get()
            .ok_or(NativeImageError::MissingImageName)?;

        let mut args: Vec<OsString> = vec![];
        let classpath = self.classpath.try_get().unwrap_or_default();
        if !classpath.is_empty() {
            args.push("-cp".into());
            args.push(join_paths(classpath)?);
        }
        args.push(format!("-H:Name={}", image_name).into());
        args.push(format!("-H:Class={}", main).into());
        args.extend(self.args.try_get().unwrap_or_default().into_iter().map(OsString::from));
        Ok(args)
    }

    /// Finds the compiler. Unless set explicitly, it's looked for on the `PATH`, then in
    /// `$GRAALVM_HOME/bin` and `$JAVA_HOME/bin`.
    pub fn find_executable(&self) -> Result<PathBuf, NativeImageError> {
        if let Some(executable) = self.executable.try_get() {
            return Ok(executable);
        }
        if let Ok(found) = which::which(NATIVE_IMAGE_EXECUTABLE) {
            return Ok(found);
        }
        ["GRAALVM_HOME", "JAVA_HOME"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(|home| Path::new(&home).join("bin").join(NATIVE_IMAGE_EXECUTABLE))
            .find(|candidate| candidate.is_file())
            .ok_or(NativeImageError::ExecutableNotFound)
    }
}

impl Task for NativeImage {
    fn task_action(task: &mut Executable<Self>, project: &Project) -> BuildResult {
        let executable = task.find_executable()?;
        let args = task.command_line()?;
        let working_dir = match task.working_dir.try_get() {
            Some(dir) => dir,
            None => project
                .build_dir()
                .map_err(|e| BuildException::custom(&e.to_string()))?
                .join("native-image"),
        };
        std::fs::create_dir_all(&working_dir)?;

        info!("building native image with {:?}", executable);
        debug!("args: {:?}", args);
        let mut command = Command::new(&executable);
        command.args(&args).current_dir(&working_dir);
        let status = execute_logged(command)?;

        if status.success() {
            Ok(())
        } else {
            Err(NativeImageError::Failed(status.code()).into())
        }
    }
}

/// Runs a command, logging its stdout at info and its stderr at warn as lines arrive.
fn execute_logged(mut command: Command) -> io::Result<ExitStatus> {
    trace!("attempting to execute command: {:?}", command);
    let mut spawned = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    let stdout = spawned
        .stdout
        .take()
        .ok_or_else(|| io::Error::new(ErrorKind::BrokenPipe, "stdout not captured"))?;
    let stderr = spawned
        .stderr
        .take()
        .ok_or_else(|| io::Error::new(ErrorKind::BrokenPipe, "stderr not captured"))?;

    thread::scope(|scope| {
        let out_join = scope.spawn(move || log_lines(stdout, Level::Info));
        let err_join = scope.spawn(move || log_lines(stderr, Level::Warn));

        let status = spawned.wait()?;
        out_join
            .join()
            .map_err(|_| io::Error::new(ErrorKind::Interrupted, "emitting to output failed"))??;
        err_join
            .join()
            .map_err(|_| io::Error::new(ErrorKind::Interrupted, "emitting to error failed"))??;
        Ok(status)
    })
}

fn log_lines<R: Read>(reader: R, level: Level) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&line);
        log!(level, "{}", text.trim_end_matches(&['\r', '\n'][..]));
    }
}

/// Errors raised while running the native image compiler
#[derive(Debug, thiserror::Error)]
pub enum NativeImageError {
    /// The task has no main class
    #[error("No main class set for the native image")]
    MissingMainClass,
    /// The task has no image name
    #[error("No image name set for the native image")]
    MissingImageName,
    /// No `native-image` executable could be found
    #[error("Couldn't find native-image on the PATH, in GRAALVM_HOME or in JAVA_HOME")]
    ExecutableNotFound,
    /// A classpath entry contains the path separator
    #[error(transparent)]
    JoinPaths(#[from] JoinPathsError),
    /// The compiler couldn't be started
    #[error(transparent)]
    Io(#[from] io::Error),
    /// The compiler exited with a failure
    #[error("native-image failed (exit code {0:?})")]
    Failed(Option<i32>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use assemble_graal_core::identifier::ProjectId;
    use assemble_graal_core::task::task_container::TaskContainer;

    fn task() -> NativeImage {
        let mut task = NativeImage::default();
        task.main.set("com.example.App").unwrap();
        task.image_name.set("demo").unwrap();
        task
    }

    #[test]
    fn command_line_order() {
        let mut task = task();
        task.classpath
            .set([PathBuf::from("libs/a.jar"), PathBuf::from("classes")])
            .unwrap();
        task.args.push("--no-fallback").unwrap();
        let args = task.command_line().unwrap();
        let expected_cp = join_paths(["libs/a.jar", "classes"]).unwrap();
        assert_eq!(
            args,
            vec![
                OsString::from("-cp"),
                expected_cp,
                OsString::from("-H:Name=demo"),
                OsString::from("-H:Class=com.example.App"),
                OsString::from("--no-fallback"),
            ]
        );
    }

    #[test]
    fn empty_classpath_omitted() {
        let args = task().command_line().unwrap();
        assert_eq!(
            args,
            vec![
                OsString::from("-H:Name=demo"),
                OsString::from("-H:Class=com.example.App"),
            ]
        );
    }

    #[test]
    fn main_class_required() {
        let mut task = task();
        task.main.clear().unwrap();
        assert!(matches!(
            task.command_line(),
            Err(NativeImageError::MissingMainClass)
        ));
    }

    #[test]
    fn descriptor_applied_without_overriding_image_name() {
        let mut container = TaskContainer::new(ProjectId::new("demo").unwrap());
        let id = container.register_task::<NativeImage>("nativeImage").unwrap();
        let mut descriptor = NativeImageDescriptor {
            enabled: false,
            entry_point_class: None,
            image_name: "demo".to_string(),
            classpath: vec![PathBuf::from("classes")],
        };
        container
            .configure_task::<NativeImage, _>(&id, |task| {
                NativeImage::apply_descriptor(task, &descriptor)?;
                Ok(())
            })
            .unwrap();
        let task = container.get_task_as::<NativeImage>(&id).unwrap();
        assert_eq!(NativeImage::descriptor(task), descriptor);

        descriptor.enabled = true;
        descriptor.entry_point_class = Some("com.example.App".to_string());
        descriptor.image_name = "other".to_string();
        container
            .configure_task::<NativeImage, _>(&id, |task| {
                NativeImage::apply_descriptor(task, &descriptor)?;
                Ok(())
            })
            .unwrap();
        let task = container.get_task_as::<NativeImage>(&id).unwrap();
        assert!(task.enabled());
        assert_eq!(task.main.try_get(), Some("com.example.App".to_string()));
        assert_eq!(task.image_name.try_get(), Some("demo".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn command_output_consumed_and_status_returned() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo out; echo err >&2; exit 3"]);
        let status = execute_logged(command).unwrap();
        assert_eq!(status.code(), Some(3));
    }

    #[test]
    fn log_lines_reads_until_end() {
        let input: &[u8] = b"first\r\nsecond\n\xffthird";
        log_lines(input, Level::Info).unwrap();
    }

    #[test]
    fn explicit_executable_used() {
        let mut task = NativeImage::default();
        task.executable.set("/opt/graalvm/bin/native-image").unwrap();
        assert_eq!(
            task.find_executable().unwrap(),
            PathBuf::from("/opt/graalvm/bin/native-image")
        );
    }
}
