use crate::{
    cli::Args,
    config::{rename_pattern, SiteOptions},
    constants::locals::FILES,
    engine::{config::build_glob_set, Statil},
    error::{Error, Result},
    ext::PathExt,
    ioutils::write_files,
    loader::load_dir,
    locals::Locals,
    paths,
};
use indexmap::IndexMap;
use log::{debug, info};
use serde_json::{Map, Value};

/// Main CLI runner that orchestrates loading, rendering and writing a site
pub struct Runner {
    args: Args,
}

impl Runner {
    pub fn new(args: Args) -> Self {
        Self { args }
    }

    /// Executes the complete render workflow
    pub fn run(self) -> Result<()> {
        let options = self.load_options()?;
        let base = self.base_locals(&options)?;
        let mut engine = self.build_engine(&options)?;

        let sources = load_dir(&self.args.src)?;
        info!("Loaded {} source file(s) from {}", sources.len(), self.args.src.display());
        engine.register_all(&sources)?;

        let rendered = engine.render_all(&base)?;
        self.write_output(&rendered)
    }

    /// Loads the options file, if one was given
    fn load_options(&self) -> Result<SiteOptions> {
        match &self.args.opts {
            Some(path) => {
                debug!("Loading options from {}", path.display());
                SiteOptions::load(path)
            }
            None => Ok(SiteOptions::default()),
        }
    }

    /// Base locals: the options' locals plus the `files` map of every `--dirs` entry,
    /// keyed by the directory as given joined with the file's relative path
    fn base_locals(&self, options: &SiteOptions) -> Result<Locals> {
        let mut locals = Locals::from(options.locals.clone());
        if self.args.dirs.is_empty() {
            return Ok(locals);
        }

        let mut files = match locals.remove(FILES) {
            Some(Value::Object(files)) => files,
            Some(other) => {
                return Err(Error::ConfigError(format!(
                    "expected the '{FILES}' local to be an object, got: {other}"
                )))
            }
            None => Map::new(),
        };
        for dir in &self.args.dirs {
            let prefix = paths::normalize(dir.to_str_checked()?);
            for (path, content) in load_dir(dir)? {
                files.insert(paths::join(&prefix, &path), Value::String(content));
            }
        }
        debug!("Exposing {} file(s) to templates", files.len());
        locals.insert(FILES, files);
        Ok(locals)
    }

    /// Builds the engine; command line values take precedence over the options file
    fn build_engine(&self, options: &SiteOptions) -> Result<Statil> {
        let mut builder = Statil::builder().settings(options.compiler_settings()?);

        if let Some(pattern) = self.args.rename.as_ref().or(options.rename.as_ref()) {
            builder = builder.rename(rename_pattern(pattern)?);
        }
        builder = builder.rename_except(
            options.rename_except.iter().chain(&self.args.rename_except).cloned(),
        );

        let post_process = if self.args.post_process.is_empty() {
            &options.post_process
        } else {
            &self.args.post_process
        };
        for processor in post_process.iter().copied() {
            builder = builder.post_process(move |content, _path| processor.apply(content));
        }

        let globs: Vec<&String> = options.ignore_paths.iter().chain(&self.args.ignore).collect();
        builder = builder.ignore_paths(build_glob_set(&globs)?);

        Ok(builder.build())
    }

    /// Writes the rendered files, or lists them in dry-run mode
    fn write_output(&self, rendered: &IndexMap<String, String>) -> Result<()> {
        if self.args.dry_run {
            for path in rendered.keys() {
                println!("{}", self.args.out.join(path).display());
            }
            println!("[DRY RUN] Would write {} file(s).", rendered.len());
            return Ok(());
        }

        write_files(&self.args.out, rendered)?;
        println!(
            "Rendered {} file(s) into {}.",
            rendered.len(),
            self.args.out.display()
        );
        Ok(())
    }
}

/// Main entry point for CLI execution
pub fn run(args: Args) -> Result<()> {
    let runner = Runner::new(args);
    runner.run()
}
