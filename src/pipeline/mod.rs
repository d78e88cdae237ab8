//! Build → collect → package pipeline
//!
//! ```text
//! sections ─┬─ build section? ── toolchain ── (build action?) collect modules
//!           └─ run section?   ── packager (from the output dir if a build ran)
//! ```
//!
//! Stages run strictly in order and the first failure stops everything after
//! it. The working directory is carried explicitly from stage to stage; the
//! driver never changes its own process directory.

pub mod build;
pub mod collect;
pub mod package;

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::DriverConfig;
use crate::error::{DriverError, Stage};
use crate::exec::{CommandResult, CommandRunner};
use crate::sections::Sections;
use crate::utils::paths::{executable_name, get_output_dir};
use crate::utils::terminal;

/// Cargo build profile, which fixes the output directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Debug,
    Release,
}

impl Profile {
    /// Directory name under `target/`
    pub fn dir_name(self) -> &'static str {
        match self {
            Profile::Debug => "debug",
            Profile::Release => "release",
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Everything the pipeline will do, worked out before anything runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub build: Option<BuildStep>,
    pub run: Option<RunStep>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStep {
    pub program: String,
    pub args: Vec<OsString>,
    pub root: PathBuf,
    /// Set only when the arguments contain a build action
    pub output: Option<BuildOutput>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub profile: Profile,
    pub dir: PathBuf,
    pub modules_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStep {
    pub packager: PathBuf,
    pub args: Vec<OsString>,
    pub work_dir: PathBuf,
}

impl Plan {
    /// Work out the stages for `sections` run from `root`
    pub fn new(sections: &Sections, root: &Path, config: &DriverConfig) -> Self {
        let build = sections.build().map(|args| BuildStep {
            program: config.toolchain.program.clone(),
            args: args.to_vec(),
            root: root.to_path_buf(),
            output: build::infer_profile(args).map(|profile| {
                let dir = get_output_dir(root, profile);
                BuildOutput {
                    profile,
                    modules_dir: dir.join(&config.modules.dir),
                    dir,
                }
            }),
        });

        let work_dir = build
            .as_ref()
            .and_then(|step| step.output.as_ref())
            .map(|output| output.dir.clone())
            .unwrap_or_else(|| root.to_path_buf());

        let run = sections.run().map(|args| RunStep {
            packager: work_dir.join(executable_name(&config.packager.name)),
            args: args.to_vec(),
            work_dir,
        });

        Self { build, run }
    }

    /// True when no stage would run
    pub fn is_empty(&self) -> bool {
        self.build.is_none() && self.run.is_none()
    }

    /// Print the plan without executing it
    pub fn print(&self) {
        if self.is_empty() {
            terminal::print_info("nothing to do: no sections given");
            return;
        }

        if let Some(step) = &self.build {
            terminal::print_info(&format!(
                "build: {} (in {})",
                terminal::format_command(&step.program, &step.args),
                step.root.display()
            ));
            match &step.output {
                Some(output) => terminal::print_info(&format!(
                    "collect: {} libraries from {} into {}",
                    output.profile,
                    output.dir.display(),
                    output.modules_dir.display()
                )),
                None => terminal::print_info("collect: skipped, no build action"),
            }
        }

        if let Some(step) = &self.run {
            terminal::print_info(&format!(
                "run: {} (in {})",
                terminal::format_command(&step.packager.display().to_string(), &step.args),
                step.work_dir.display()
            ));
        }
    }
}

/// What happened during a completed pipeline run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Report {
    pub built: bool,
    pub collected: Vec<PathBuf>,
    pub packaged: bool,
}

/// Drives the stages of a [`Plan`] through a [`CommandRunner`]
pub struct Pipeline<R: CommandRunner> {
    runner: R,
    verbose: bool,
}

impl<R: CommandRunner> Pipeline<R> {
    pub fn new(runner: R, verbose: bool) -> Self {
        Self { runner, verbose }
    }

    /// Execute the plan, stopping at the first fatal error
    pub fn execute(&mut self, plan: &Plan) -> Result<Report, DriverError> {
        let mut report = Report::default();

        if let Some(step) = &plan.build {
            build::invoke_toolchain(
                &mut self.runner,
                &step.program,
                &step.args,
                &step.root,
                self.verbose,
            )?;
            report.built = true;

            if let Some(output) = &step.output {
                report.collected = collect::collect_modules(&output.dir, &output.modules_dir)?;
                if !report.collected.is_empty() {
                    terminal::print_success(&format!(
                        "Collected {} module(s) into {}",
                        report.collected.len(),
                        output.modules_dir.display()
                    ));
                } else if self.verbose {
                    terminal::print_info(&format!(
                        "No libraries to collect in {}",
                        output.dir.display()
                    ));
                }
            }
        }

        if let Some(step) = &plan.run {
            package::invoke_packager(
                &mut self.runner,
                &step.packager,
                &step.args,
                &step.work_dir,
                self.verbose,
            )?;
            report.packaged = true;
        }

        Ok(report)
    }

    #[cfg(test)]
    fn into_runner(self) -> R {
        self.runner
    }
}

/// Turn a finished subprocess into success or a stage failure
fn check_status(
    stage: Stage,
    program: &Path,
    args: &[OsString],
    result: &CommandResult,
    verbose: bool,
) -> Result<(), DriverError> {
    if verbose {
        terminal::print_info(&format!(
            "{} finished in {:.2}s: {}",
            stage,
            result.duration.as_secs_f64(),
            terminal::format_command(&program.display().to_string(), args)
        ));
    }

    if result.success() {
        Ok(())
    } else {
        Err(DriverError::StageFailed {
            stage,
            code: result.exit_code,
        })
    }
}

fn spawn_error(stage: Stage, program: &Path, source: anyhow::Error) -> DriverError {
    DriverError::Spawn {
        stage,
        program: program.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sections;
    use std::env::consts::DLL_EXTENSION;
    use std::fs;
    use std::time::Duration;

    /// Records every invocation and answers with scripted exit codes
    #[derive(Default)]
    struct FakeRunner {
        calls: Vec<(PathBuf, Vec<OsString>, PathBuf)>,
        exit_codes: Vec<Option<i32>>,
        /// Files to create in the call's working directory, per call
        produce: Vec<Vec<String>>,
    }

    impl CommandRunner for FakeRunner {
        fn run(
            &mut self,
            program: &Path,
            args: &[OsString],
            cwd: &Path,
        ) -> anyhow::Result<CommandResult> {
            let index = self.calls.len();
            self.calls
                .push((program.to_path_buf(), args.to_vec(), cwd.to_path_buf()));

            if let Some(files) = self.produce.get(index) {
                for file in files {
                    let path = cwd.join(file);
                    fs::create_dir_all(path.parent().unwrap())?;
                    fs::write(path, b"")?;
                }
            }

            Ok(CommandResult {
                exit_code: self.exit_codes.get(index).copied().unwrap_or(Some(0)),
                duration: Duration::ZERO,
            })
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        config: DriverConfig,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("fake-cargo"), b"").unwrap();
            let mut config = DriverConfig::default();
            config.toolchain.program = "./fake-cargo".to_string();
            Self { dir, config }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn plan(&self, args: &[&str]) -> Plan {
            let split = sections::split(args.iter().copied());
            Plan::new(&split.sections, self.root(), &self.config)
        }

        fn install_packager(&self, dir: &Path) -> PathBuf {
            fs::create_dir_all(dir).unwrap();
            let path = dir.join(executable_name("purgepack"));
            fs::write(&path, b"").unwrap();
            path
        }
    }

    fn os(tokens: &[&str]) -> Vec<OsString> {
        tokens.iter().map(OsString::from).collect()
    }

    fn lib(stem: &str) -> String {
        format!("{}.{}", stem, DLL_EXTENSION)
    }

    #[test]
    fn test_no_sections_runs_nothing() {
        let fx = Fixture::new();
        let plan = fx.plan(&["stray", "tokens"]);
        assert!(plan.is_empty());

        let mut pipeline = Pipeline::new(FakeRunner::default(), false);
        let report = pipeline.execute(&plan).unwrap();
        assert_eq!(report, Report::default());
        assert!(pipeline.into_runner().calls.is_empty());
    }

    #[test]
    fn test_release_build_and_run_plan() {
        let fx = Fixture::new();
        let plan = fx.plan(&["@cargo", "build", "--release", "@run", "pack", "-v"]);

        let build = plan.build.as_ref().unwrap();
        assert_eq!(build.args, os(&["build", "--release"]));
        let output = build.output.as_ref().unwrap();
        assert_eq!(output.profile, Profile::Release);
        assert_eq!(output.dir, fx.root().join("target").join("release"));
        assert_eq!(output.modules_dir, output.dir.join("modules"));

        let run = plan.run.as_ref().unwrap();
        assert_eq!(run.args, os(&["pack", "-v"]));
        assert_eq!(run.work_dir, output.dir);
        assert_eq!(run.packager, output.dir.join(executable_name("purgepack")));
    }

    #[test]
    fn test_full_pipeline_collects_then_packages() {
        let fx = Fixture::new();
        let out = fx.root().join("target").join("debug");
        let packager = fx.install_packager(&out);
        let plan = fx.plan(&["@cargo", "build", "@run", "pack"]);

        let runner = FakeRunner {
            produce: vec![vec![
                format!("target/debug/{}", lib("mod_a")),
                "target/debug/notes.txt".to_string(),
            ]],
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(runner, false);
        let report = pipeline.execute(&plan).unwrap();

        assert!(report.built);
        assert!(report.packaged);
        assert_eq!(report.collected, vec![out.join("modules").join(lib("mod_a"))]);
        assert!(out.join("notes.txt").is_file());

        let calls = pipeline.into_runner().calls;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, fx.root().join("./fake-cargo"));
        assert_eq!(calls[0].1, os(&["build"]));
        assert_eq!(calls[0].2, fx.root());
        assert_eq!(calls[1].0, packager);
        assert_eq!(calls[1].1, os(&["pack"]));
        assert_eq!(calls[1].2, out);
    }

    #[test]
    fn test_check_skips_collection() {
        let fx = Fixture::new();
        let plan = fx.plan(&["@cargo", "check"]);
        assert!(plan.build.as_ref().unwrap().output.is_none());

        let runner = FakeRunner {
            produce: vec![vec![format!("target/debug/{}", lib("mod_a"))]],
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(runner, false);
        let report = pipeline.execute(&plan).unwrap();

        assert!(report.built);
        assert!(report.collected.is_empty());
        assert!(!fx.root().join("target/debug/modules").exists());
        assert!(!fx.root().join("target/release/modules").exists());
    }

    #[test]
    fn test_failed_build_stops_pipeline() {
        let fx = Fixture::new();
        let out = fx.root().join("target").join("debug");
        fx.install_packager(&out);
        let plan = fx.plan(&["@cargo", "build", "@run", "pack"]);

        let runner = FakeRunner {
            exit_codes: vec![Some(2)],
            produce: vec![vec![format!("target/debug/{}", lib("mod_a"))]],
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(runner, false);
        let err = pipeline.execute(&plan).unwrap_err();

        assert_eq!(err.exit_code(), 2);
        assert!(matches!(
            err,
            DriverError::StageFailed {
                stage: Stage::Build,
                code: Some(2)
            }
        ));
        // Neither collection nor packaging happened
        assert!(!out.join("modules").exists());
        assert_eq!(pipeline.into_runner().calls.len(), 1);
    }

    #[test]
    fn test_failed_packager_propagates_code() {
        let fx = Fixture::new();
        fx.install_packager(fx.root());
        let plan = fx.plan(&["@run", "pack"]);

        let runner = FakeRunner {
            exit_codes: vec![Some(7)],
            ..Default::default()
        };
        let mut pipeline = Pipeline::new(runner, false);
        let err = pipeline.execute(&plan).unwrap_err();
        assert_eq!(err.exit_code(), 7);
    }

    #[test]
    fn test_run_without_build_uses_root() {
        let fx = Fixture::new();
        let packager = fx.install_packager(fx.root());
        let plan = fx.plan(&["@run", "pack"]);

        let mut pipeline = Pipeline::new(FakeRunner::default(), false);
        pipeline.execute(&plan).unwrap();

        let calls = pipeline.into_runner().calls;
        assert_eq!(calls, vec![(packager, os(&["pack"]), fx.root().to_path_buf())]);
    }

    #[test]
    fn test_run_after_check_stays_in_root() {
        let fx = Fixture::new();
        let plan = fx.plan(&["@cargo", "check", "@run"]);
        assert_eq!(plan.run.as_ref().unwrap().work_dir, fx.root());
    }

    #[test]
    fn test_missing_packager_is_reported() {
        let fx = Fixture::new();
        let plan = fx.plan(&["@run", "pack"]);

        let mut pipeline = Pipeline::new(FakeRunner::default(), false);
        let err = pipeline.execute(&plan).unwrap_err();

        assert!(matches!(err, DriverError::MissingTool { stage: Stage::Run, .. }));
        assert_eq!(err.exit_code(), 1);
        assert!(pipeline.into_runner().calls.is_empty());
    }

    #[test]
    fn test_missing_toolchain_is_reported() {
        let mut fx = Fixture::new();
        fx.config.toolchain.program = "./no-such-cargo".to_string();
        let plan = fx.plan(&["@cargo", "build"]);

        let mut pipeline = Pipeline::new(FakeRunner::default(), false);
        let err = pipeline.execute(&plan).unwrap_err();
        assert!(matches!(err, DriverError::MissingTool { stage: Stage::Build, .. }));
    }

    #[test]
    fn test_custom_modules_dir() {
        let mut fx = Fixture::new();
        fx.config.modules.dir = "plugins".into();
        let plan = fx.plan(&["@cargo", "build", "-r"]);

        let output = plan.build.unwrap().output.unwrap();
        assert_eq!(
            output.modules_dir,
            fx.root().join("target").join("release").join("plugins")
        );
    }
}
