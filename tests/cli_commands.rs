//! Command-level tests: parse argv, run against an injected environment,
//! and check what would be printed.

use clap::Parser;
use pathuni::{cli::Args, commands, ContextEnv};
use pretty_assertions::assert_eq;
use std::{collections::BTreeMap, fs, path::PathBuf};
use tempfile::TempDir;

const CONFIG: &str = r#"
linux:
  paths:
    - $ROOT/bin
    - $ROOT/missing
    - path: $ROOT/games
      tags: [gaming]
    - path: $ROOT/work
      tags: [work]
"#;

struct Setup {
    dir: TempDir,
    config: PathBuf,
    vars: BTreeMap<String, String>,
}

impl Setup {
    fn new(config: &str) -> Self {
        let dir = TempDir::new().unwrap();
        for d in ["bin", "games", "work", "usr"] {
            fs::create_dir_all(dir.path().join(d)).unwrap();
        }
        let config_path = dir.path().join("my_paths.yaml");
        fs::write(&config_path, config).unwrap();

        let root = dir.path().to_string_lossy().into_owned();
        let vars = BTreeMap::from([
            ("ROOT".to_string(), root.clone()),
            ("HOME".to_string(), root.clone()),
            ("SHELL".to_string(), "/usr/bin/zsh".to_string()),
            ("PATH".to_string(), format!("{root}/usr:{root}/gone")),
        ]);

        Self {
            dir,
            config: config_path,
            vars,
        }
    }

    fn root(&self) -> String {
        self.dir.path().to_string_lossy().into_owned()
    }

    fn args(&self, extra: &[&str]) -> Args {
        let mut argv = vec![
            "pathuni".to_string(),
            "--config".to_string(),
            self.config.to_string_lossy().into_owned(),
            "--os".to_string(),
            "linux".to_string(),
        ];
        argv.extend(extra.iter().map(|s| s.to_string()));
        Args::try_parse_from(argv).unwrap()
    }

    fn run(&self, extra: &[&str]) -> anyhow::Result<String> {
        commands::run(&self.args(extra), &ContextEnv::from_vars(self.vars.clone()))
    }
}

#[test]
fn test_init_renders_posix_export() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    assert_eq!(
        s.run(&[]).unwrap(),
        format!("export PATH=\"{r}/bin:{r}/games:{r}/work\"\n")
    );
}

#[test]
fn test_init_honours_tag_filters() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    assert_eq!(
        s.run(&["init", "--tags-exclude", "gaming"]).unwrap(),
        format!("export PATH=\"{r}/bin:{r}/work\"\n")
    );
    assert_eq!(
        s.run(&["init", "--tags-include", "work"]).unwrap(),
        format!("export PATH=\"{r}/bin:{r}/work\"\n")
    );
}

#[test]
fn test_init_for_fish_and_powershell() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    assert_eq!(
        s.run(&["--shell", "fish", "--tags-exclude", "gaming,work"]).unwrap(),
        format!("set -gx PATH \"{r}/bin\"\n")
    );
    assert_eq!(
        s.run(&["--shell", "pwsh", "--tags-exclude", "gaming,work"]).unwrap(),
        format!("$env:PATH = \"{r}/bin\"\n")
    );
}

#[test]
fn test_merged_scope_appends_live_path() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    assert_eq!(
        s.run(&["--scope", "merged", "--tags-exclude", "gaming,work"]).unwrap(),
        format!("export PATH=\"{r}/bin:{r}/usr:{r}/gone\"\n")
    );
    assert_eq!(
        s.run(&["--scope", "merged", "--prune", "all", "--tags-exclude", "gaming,work"])
            .unwrap(),
        format!("export PATH=\"{r}/bin:{r}/usr\"\n")
    );
}

#[test]
fn test_defer_env_references_runtime_path() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    assert_eq!(
        s.run(&["--scope", "merged", "--defer-env", "--tags-exclude", "gaming,work"])
            .unwrap(),
        format!("export PATH=\"{r}/bin:${{PATH}}\"\n")
    );
}

#[test]
fn test_defer_env_requires_merged_scope() {
    let s = Setup::new(CONFIG);
    let err = s.run(&["--defer-env"]).unwrap_err();
    assert!(
        err.to_string().contains("--defer-env requires --scope merged"),
        "{err:#}"
    );

    let err = s
        .run(&["--scope", "merged", "--defer-env", "--prune", "environment"])
        .unwrap_err();
    assert!(err.to_string().contains("--prune environment"), "{err:#}");
}

#[test]
fn test_dry_run_explains_each_path() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    let out = s.run(&["dry-run", "--tags-exclude", "gaming"]).unwrap();

    assert!(out.starts_with(&format!("Evaluating: {}\n\n", s.config.display())), "{out}");
    assert!(out.contains("OS    : Linux (specified)\n"), "{out}");
    assert!(out.contains("Shell : zsh (inferred)\n"), "{out}");
    assert!(out.contains("Flags : scope=config prune=config exclude=gaming\n"), "{out}");
    assert!(out.contains(&format!("  [+] {r}/bin\n")), "{out}");
    assert!(out.contains(&format!("  [!] {r}/missing (not found)\n")), "{out}");
    assert!(out.contains(&format!("  [-] {r}/games\n")), "{out}");
    assert!(out.contains("gaming = gaming"), "{out}");
    assert!(out.contains("2 paths included in total\n"), "{out}");
    assert!(out.contains("2 skipped in total\n"), "{out}");
    assert!(
        out.ends_with(&format!("\nOutput would be:\n  export PATH=\"{r}/bin:{r}/work\"\n")),
        "{out}"
    );
}

#[test]
fn test_dry_run_marks_missing_environment_paths() {
    let s = Setup::new("linux: []\n");
    let r = s.root();
    let out = s
        .run(&["eval", "--scope", "environment", "--prune", "environment"])
        .unwrap();

    assert!(out.contains(&format!("  [.] {r}/usr\n")), "{out}");
    assert!(out.contains(&format!("  [?] {r}/gone (not found)\n")), "{out}");
}

#[test]
fn test_dump_formats() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    let plain = s.run(&["dump", "--tags-exclude", "gaming,work"]).unwrap();
    assert_eq!(plain, format!("{r}/bin\n"));

    let json = s
        .run(&["dump", "--format", "json", "--tags-exclude", "gaming,work"])
        .unwrap();
    assert_eq!(json, format!("{{\"PATH\":[\"{r}/bin\"]}}\n"));

    let yaml = s
        .run(&["dump", "--format", "yaml", "--tags-exclude", "gaming,work"])
        .unwrap();
    assert!(yaml.starts_with("PATH:\n"), "{yaml}");
    assert!(yaml.contains(&format!("- {r}/bin")), "{yaml}");
}

#[test]
fn test_invalid_filter_is_reported_before_config_is_read() {
    let s = Setup::new(CONFIG);
    let args = Args::try_parse_from([
        "pathuni",
        "--config",
        "/definitely/not/here.yaml",
        "--tags-include",
        "home,2invalid",
    ])
    .unwrap();

    let err = commands::run(&args, &ContextEnv::from_vars(s.vars.clone())).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("--tags-include"), "{msg}");
    assert!(msg.contains("'2invalid'"), "{msg}");
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let s = Setup::new(CONFIG);
    let args = Args::try_parse_from(["pathuni", "--os", "linux", "--config", "/no/such/file.yaml"]).unwrap();

    let err = commands::run(&args, &ContextEnv::from_vars(s.vars.clone())).unwrap_err();
    assert!(
        err.to_string()
            .contains("--config points to a config file that does not exist"),
        "{err:#}"
    );
}

#[test]
fn test_config_from_environment_variable() {
    let s = Setup::new(CONFIG);
    let r = s.root();
    let mut vars = s.vars.clone();
    vars.insert(
        "PATHUNI_CONFIG".to_string(),
        s.config.to_string_lossy().into_owned(),
    );

    let args = Args::try_parse_from(["pathuni", "--os", "linux", "dump", "--tags-exclude", "gaming"]).unwrap();
    let out = commands::run(&args, &ContextEnv::from_vars(vars.clone())).unwrap();
    assert_eq!(out, format!("{r}/bin\n{r}/work\n"));

    vars.insert("PATHUNI_CONFIG".to_string(), format!("{r}/nope.yaml"));
    let err = commands::run(&args, &ContextEnv::from_vars(vars)).unwrap_err();
    assert!(err.to_string().starts_with("PATHUNI_CONFIG points to"), "{err:#}");
}

#[test]
fn test_malformed_config_names_file_and_problem() {
    let s = Setup::new("linux:\n  tags: [dev, DEV]\n  paths: []\n");
    let err = s.run(&[]).unwrap_err();
    let msg = format!("{err:#}");
    assert!(msg.contains("while loading"), "{msg}");
    assert!(msg.contains("my_paths.yaml"), "{msg}");
    assert!(msg.contains("duplicate tag 'DEV'"), "{msg}");
}

#[test]
fn test_unsupported_login_shell_needs_override() {
    let s = Setup::new(CONFIG);
    let mut vars = s.vars.clone();
    vars.insert("SHELL".to_string(), "/bin/tcsh".to_string());

    let err = commands::run(&s.args(&[]), &ContextEnv::from_vars(vars.clone())).unwrap_err();
    assert!(err.to_string().contains("unsupported shell 'tcsh'"), "{err:#}");

    let out = commands::run(&s.args(&["--shell", "bash"]), &ContextEnv::from_vars(vars)).unwrap();
    assert!(out.starts_with("export PATH="), "{out}");
}
