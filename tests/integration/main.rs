//! Integration tests for modmap

mod library_tests {
    use modmap::cache::CacheStore;
    use modmap::mapping::{MappingFileLoader, SourceHost, StreamLoader};
    use modmap::resolvers::DirectoryResolver;
    use modmap::vfs::{SourceRef, VirtualSourceRegistry, VirtualStream};
    use modmap::{
        Chain, HookInitializer, Initializer, LoadAction, LoadOutcome, LoaderError, LoaderOptions,
        LoaderResult, ModuleLoader, Resolver, ResolverSet,
    };
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    type Effects = Arc<Mutex<Vec<String>>>;

    /// Host that records what each stream said and where it claimed to be from
    #[derive(Clone, Default)]
    struct EffectHost {
        effects: Effects,
    }

    impl SourceHost for EffectHost {
        fn execute(&self, stream: &mut VirtualStream) -> LoaderResult<()> {
            let text = stream.read_to_text()?;
            let origin = stream
                .stat()?
                .origin
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "anonymous".to_string());
            self.effects
                .lock()
                .unwrap()
                .push(format!("run {:?} from {}", text, origin));
            Ok(())
        }
    }

    struct EffectInit {
        effects: Effects,
    }

    impl Initializer for EffectInit {
        fn init(&self, identifier: &str) {
            self.effects
                .lock()
                .unwrap()
                .push(format!("init {}", identifier));
        }
    }

    struct TableResolver {
        chains: HashMap<String, Chain>,
    }

    impl Resolver for TableResolver {
        fn resolve(&self, identifier: &str) -> LoaderResult<Chain> {
            Ok(self.chains.get(identifier).cloned().unwrap_or_default())
        }
    }

    fn cascade_chain() -> Chain {
        vec![
            LoadAction::from_source("D1", "d1 body").with_file("/orig/D1.src"),
            LoadAction::from_source("D2", "d2 body").with_file("/orig/D2.src"),
            LoadAction::from_source("Target", "target body").with_file("/orig/Target.src"),
        ]
    }

    fn build(cache_dir: Option<&Path>, chains: Vec<(&str, Chain)>) -> (ModuleLoader, Effects) {
        let effects = Effects::default();
        let files: Arc<dyn MappingFileLoader> = Arc::new(StreamLoader::new(
            VirtualSourceRegistry::new(),
            EffectHost {
                effects: effects.clone(),
            },
        ));
        let init: Arc<dyn Initializer> = Arc::new(EffectInit {
            effects: effects.clone(),
        });
        let resolver: Box<dyn Resolver> = Box::new(TableResolver {
            chains: chains
                .into_iter()
                .map(|(id, chain)| (id.to_string(), chain))
                .collect(),
        });
        let options = LoaderOptions {
            enable_caching: cache_dir.is_some(),
            cache_dir: cache_dir.map(Path::to_path_buf),
            ..Default::default()
        };
        let loader = ModuleLoader::new(options, vec![resolver], Some(init), files).unwrap();
        (loader, effects)
    }

    #[test]
    fn chain_without_requested_identifier_is_rejected() {
        let mut set = ResolverSet::default();
        set.push(Box::new(TableResolver {
            chains: HashMap::from([(
                "Wanted".to_string(),
                vec![LoadAction::from_source("Other", "x")],
            )]),
        }));

        let err = set.resolve("Wanted").unwrap_err();
        assert!(matches!(err, LoaderError::ChainIdentifierMismatch { .. }));
    }

    #[test]
    fn action_without_source_or_file_is_rejected() {
        let mut set = ResolverSet::default();
        set.push(Box::new(TableResolver {
            chains: HashMap::from([(
                "Wanted".to_string(),
                vec![LoadAction::from_source("Wanted", "")],
            )]),
        }));

        let err = set.resolve("Wanted").unwrap_err();
        assert!(matches!(err, LoaderError::InvalidChain { .. }));
    }

    #[test]
    fn cold_cache_matches_uncached_effects() {
        let temp = TempDir::new().unwrap();

        let (uncached, uncached_effects) = build(None, vec![("Target", cascade_chain())]);
        assert_eq!(uncached.load("Target").unwrap(), LoadOutcome::Resolved);

        let (cached, cached_effects) =
            build(Some(temp.path()), vec![("Target", cascade_chain())]);
        assert_eq!(cached.load("Target").unwrap(), LoadOutcome::Resolved);

        let uncached_effects = uncached_effects.lock().unwrap().clone();
        assert_eq!(uncached_effects, *cached_effects.lock().unwrap());
        assert_eq!(
            uncached_effects,
            vec![
                "run \"d1 body\" from /orig/D1.src",
                "init D1",
                "run \"d2 body\" from /orig/D2.src",
                "init D2",
                "run \"target body\" from /orig/Target.src",
                "init Target",
            ]
        );
    }

    #[test]
    fn cached_load_from_fresh_process_reports_origin() {
        let temp = TempDir::new().unwrap();
        let (first, _) = build(Some(temp.path()), vec![("Target", cascade_chain())]);
        first.load("Target").unwrap();

        // A second loader over the same directory with no resolvers at all
        let (second, effects) = build(Some(temp.path()), vec![]);
        assert_eq!(second.load("Target").unwrap(), LoadOutcome::Cached);
        assert_eq!(
            *effects.lock().unwrap(),
            vec![
                "run \"target body\" from /orig/Target.src",
                "init Target"
            ]
        );
    }

    #[test]
    fn repeated_loads_do_not_repeat_hooks() {
        let temp = TempDir::new().unwrap();
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = runs.clone();
        let mut hooks = HookInitializer::new();
        hooks.register("Target", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let hooks: Arc<dyn Initializer> = Arc::new(hooks);

        let files: Arc<dyn MappingFileLoader> = Arc::new(StreamLoader::new(
            VirtualSourceRegistry::new(),
            EffectHost::default(),
        ));
        let resolver: Box<dyn Resolver> = Box::new(TableResolver {
            chains: HashMap::from([("Target".to_string(), cascade_chain())]),
        });
        let options = LoaderOptions {
            enable_caching: true,
            cache_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let loader = ModuleLoader::new(options, vec![resolver], Some(hooks), files).unwrap();

        assert_eq!(loader.load("Target").unwrap(), LoadOutcome::Resolved);
        assert_eq!(loader.load("Target").unwrap(), LoadOutcome::Cached);
        assert_eq!(runs.load(Ordering::SeqCst), 1);
    }

    /// Resolver whose single answer can be edited between loads
    struct EditableResolver {
        source: Arc<Mutex<String>>,
    }

    impl Resolver for EditableResolver {
        fn resolve(&self, identifier: &str) -> LoaderResult<Chain> {
            if identifier != "T" {
                return Ok(Vec::new());
            }
            let source = self.source.lock().unwrap().clone();
            Ok(vec![LoadAction::from_source("T", source).with_file("/orig/T.src")])
        }
    }

    #[test]
    fn reload_after_purge_runs_new_artifact() {
        let temp = TempDir::new().unwrap();
        let effects = Effects::default();
        let source = Arc::new(Mutex::new("v1".to_string()));
        let files: Arc<dyn MappingFileLoader> = Arc::new(StreamLoader::new(
            VirtualSourceRegistry::new(),
            EffectHost {
                effects: effects.clone(),
            },
        ));
        let resolver: Box<dyn Resolver> = Box::new(EditableResolver {
            source: source.clone(),
        });
        let options = LoaderOptions {
            enable_caching: true,
            cache_dir: Some(temp.path().to_path_buf()),
            ..Default::default()
        };
        let loader = ModuleLoader::new(options, vec![resolver], None, files).unwrap();

        assert_eq!(loader.load("T").unwrap(), LoadOutcome::Resolved);
        loader.clear_specific(&["T"]).unwrap();
        *source.lock().unwrap() = "v2".to_string();
        assert_eq!(loader.load("T").unwrap(), LoadOutcome::Resolved);

        // Same artifact path after a full clear
        assert!(loader.clear_cache().unwrap());
        *source.lock().unwrap() = "v3".to_string();
        assert_eq!(loader.load("T").unwrap(), LoadOutcome::Resolved);
        assert_eq!(loader.load("T").unwrap(), LoadOutcome::Cached);

        assert_eq!(
            *effects.lock().unwrap(),
            vec![
                "run \"v1\" from /orig/T.src",
                "run \"v2\" from /orig/T.src",
                "run \"v3\" from /orig/T.src",
            ]
        );
    }

    #[test]
    fn purge_cascade_follows_recorded_chains() {
        let temp = TempDir::new().unwrap();
        let (loader, _) = build(Some(temp.path()), vec![("Target", cascade_chain())]);
        loader.load("Target").unwrap();
        let cache = loader.cache().unwrap();
        let cached = |id: &str| cache.entry(id).status().unwrap().is_cached();

        cache.entry("D1").purge().unwrap();
        assert!(!cached("D1"));
        assert!(!cached("D2"));
        assert!(cached("Target"));

        cache.entry("Target").purge().unwrap();
        assert!(!cached("Target"));
        assert!(cache.entry("Target").meta().unwrap().is_none());
    }

    #[test]
    fn dependency_and_origin_map_layout() {
        let temp = TempDir::new().unwrap();
        let chain = vec![
            LoadAction::from_source("A/B", "b"),
            LoadAction::from_source("A/B/C", "c").with_file("/orig/C.src"),
        ];
        let (loader, _) = build(Some(temp.path()), vec![("A/B/C", chain)]);
        loader.load("A/B/C").unwrap();

        assert!(temp.path().join("A/B.php").is_file());
        assert!(temp.path().join("A/B/C.php").is_file());
        assert!(!temp.path().join("A/B.map").exists());
        assert_eq!(
            std::fs::read_to_string(temp.path().join("A/B/C.map")).unwrap(),
            "/orig/C.src"
        );

        let cache = loader.cache().unwrap();
        assert_eq!(
            cache.entry("A/B/C").meta().unwrap().unwrap().dependency_chain,
            vec!["A/B"]
        );
        assert!(cache
            .entry("A/B")
            .meta()
            .unwrap()
            .unwrap()
            .dependency_chain
            .is_empty());
    }

    #[test]
    fn unresolvable_identifier_leaves_no_trace() {
        let temp = TempDir::new().unwrap();
        let cache_dir = temp.path().join("cache");
        let (loader, effects) = build(Some(&cache_dir), vec![]);

        assert_eq!(loader.load("Nowhere").unwrap(), LoadOutcome::Unresolved);
        assert!(!cache_dir.exists());
        assert!(effects.lock().unwrap().is_empty());
    }

    #[test]
    fn fragment_name_is_single_use() {
        let registry = VirtualSourceRegistry::new();
        registry.set_fragment("gen/Proxy", "text", None).unwrap();
        assert!(matches!(
            registry.set_fragment("gen/Proxy", "again", None),
            Err(LoaderError::DuplicateFragment(_))
        ));

        let mut stream = registry.open(&SourceRef::fragment("gen/Proxy")).unwrap();
        assert_eq!(stream.read_to_text().unwrap(), "text");
        assert!(stream.eof());
        stream.close();

        registry.set_fragment("gen/Proxy", "again", None).unwrap();
        assert!(registry.has_fragment("gen/Proxy"));
    }

    #[test]
    fn directory_resolver_with_stream_loader() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("src");
        std::fs::create_dir_all(src.join("App")).unwrap();
        let file = src.join("App").join("Model.php");
        std::fs::write(&file, "<?php model").unwrap();

        let effects = Effects::default();
        let files: Arc<dyn MappingFileLoader> = Arc::new(StreamLoader::new(
            VirtualSourceRegistry::new(),
            EffectHost {
                effects: effects.clone(),
            },
        ));
        let resolver: Box<dyn Resolver> = Box::new(DirectoryResolver::new(vec![src], "php"));
        let cache_dir = temp.path().join("cache");
        let options = LoaderOptions {
            enable_caching: true,
            cache_dir: Some(cache_dir.clone()),
            ..Default::default()
        };
        let loader = ModuleLoader::new(options, vec![resolver], None, files.clone()).unwrap();

        assert_eq!(loader.load("App\\Model").unwrap(), LoadOutcome::Resolved);
        assert_eq!(loader.scan_identifiers().unwrap(), vec!["App\\Model"]);

        // Path-only actions are recorded as an include, not copied
        assert!(!cache_dir.join("App/Model.php").exists());
        let store = CacheStore::new(&cache_dir, files);
        assert_eq!(
            store.entry("App\\Model").meta().unwrap().unwrap().include,
            Some(PathBuf::from(&file))
        );
        assert_eq!(
            *effects.lock().unwrap(),
            vec![format!("run \"<?php model\" from {}", file.display())]
        );
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use modmap::config::Config;
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn modmap() -> Command {
        cargo_bin_cmd!("modmap")
    }

    /// Project with one source file and a config pointing at it
    struct Project {
        temp: TempDir,
        config: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            let src = temp.path().join("src");
            fs::create_dir_all(src.join("App")).unwrap();
            fs::write(src.join("App").join("Foo.php"), "<?php class Foo {}").unwrap();
            fs::write(src.join("App").join("Foo.php.hint"), "<?php class Foo {} // hint")
                .unwrap();

            let mut config = Config::default();
            config.cache.dir = Some(temp.path().join("cache"));
            config.resolver.roots = vec![src];
            config.resolver.inline_source = true;
            let path = temp.path().join("config.toml");
            fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

            Self { temp, config: path }
        }

        fn root(&self) -> &Path {
            self.temp.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = modmap();
            cmd.current_dir(self.root())
                .env("MODMAP_CONFIG", &self.config)
                .arg("--no-local");
            cmd
        }
    }

    #[test]
    fn help_displays() {
        modmap()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("compile cache"));
    }

    #[test]
    fn version_displays() {
        modmap()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("modmap"));
    }

    #[test]
    fn config_path_follows_flag() {
        let project = Project::new();
        project
            .cmd()
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let project = Project::new();
        project
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("[cache]")
                    .and(predicate::str::contains("inline_source = true")),
            );
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let project = Project::new();
        project
            .cmd()
            .args(["config", "init"])
            .assert()
            .success()
            .stdout(predicate::str::contains("already exists"));
    }

    #[test]
    fn load_resolves_then_hits_cache() {
        let project = Project::new();
        project
            .cmd()
            .args(["load", "App/Foo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Loaded App/Foo (resolved)"));

        assert!(project.root().join("cache/App/Foo.php").is_file());
        assert!(project.root().join("cache/App/Foo.map").is_file());

        project
            .cmd()
            .args(["load", "App/Foo"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("Loaded App/Foo (cached)")
                    .and(predicate::str::contains("Foo.php")),
            );
    }

    #[test]
    fn load_unknown_identifier_fails() {
        let project = Project::new();
        project
            .cmd()
            .args(["load", "App/Missing"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Could not resolve: App/Missing"));
        assert!(!project.root().join("cache").exists());
    }

    #[test]
    fn load_without_cache_writes_nothing() {
        let project = Project::new();
        project
            .cmd()
            .args(["load", "--no-cache", "App/Foo"])
            .assert()
            .success();
        assert!(!project.root().join("cache").exists());
    }

    #[test]
    fn prime_show_and_purge() {
        let project = Project::new();
        project
            .cmd()
            .arg("prime")
            .assert()
            .success()
            .stdout(predicate::str::contains("Primed 1 of 1"));

        project
            .cmd()
            .args(["show", "App\\Foo", "--format", "json"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("\"artifact\": \"")
                    .and(predicate::str::contains("Foo.php")),
            );

        project
            .cmd()
            .args(["purge", "App\\Foo"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Purged App\\Foo"));

        project
            .cmd()
            .args(["show", "App\\Foo", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"artifact\": null"));
    }

    #[test]
    fn hints_are_written() {
        let project = Project::new();
        let target = project.root().join("hints");
        project
            .cmd()
            .arg("hints")
            .arg(&target)
            .assert()
            .success()
            .stdout(predicate::str::contains("Wrote 1 hint file(s)"));

        assert_eq!(
            fs::read_to_string(target.join("App").join("Foo.php")).unwrap(),
            "<?php class Foo {} // hint"
        );
    }

    #[test]
    fn clear_requires_confirmation() {
        let project = Project::new();
        project.cmd().args(["load", "App/Foo"]).assert().success();

        // Non-interactive without --yes keeps the default answer (no)
        project.cmd().arg("clear").assert().success();
        assert!(project.root().join("cache").exists());

        project
            .cmd()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache cleared"));
        assert!(!project.root().join("cache").exists());
    }

    #[test]
    fn read_serves_cached_bytes_under_original_origin() {
        let project = Project::new();
        project.cmd().args(["load", "App/Foo"]).assert().success();

        let artifact = project.root().join("cache").join("App").join("Foo.php");
        let original = project.root().join("src").join("App").join("Foo.php");
        let reference = format!(
            "modmap-include://-/{},{}",
            artifact.display(),
            original.display()
        );
        let output = project
            .cmd()
            .args(["read", &reference, "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(report["content"], "<?php class Foo {}");
        assert_eq!(report["origin"], original.display().to_string());
        assert_eq!(report["size"], 18);
    }

    #[test]
    fn read_rejects_malformed_reference() {
        let project = Project::new();
        project
            .cmd()
            .args(["read", "file:///etc/passwd"])
            .assert()
            .failure()
            .stderr(
                predicate::str::contains("Invalid source reference")
                    .and(predicate::str::contains("Hint:")),
            );
    }

    #[test]
    fn invalid_config_shows_hint() {
        let project = Project::new();
        fs::write(&project.config, "[cache]\nenabled = \"maybe\"\n").unwrap();
        project
            .cmd()
            .args(["load", "App/Foo"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:").and(predicate::str::contains("Hint:")));
    }
}
