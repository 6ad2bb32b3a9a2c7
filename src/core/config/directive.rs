// ─── Directive Dispatcher ───
// Maps launch-file keywords to handlers that fill a `LaunchDescriptor`.

use std::io::BufRead;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::condition::Conditional;
use super::descriptor::{LaunchDescriptor, NativeLib};
use super::environment::Environment;
use super::expand::expand;
use super::words::{is_comment_or_blank, split_words};
use super::{MAJOR_VERSION, MINOR_VERSION};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::props::PropertySource;
use crate::core::validate::Validator;

/// Every keyword this interpreter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Require,
    Rel,
    Validate,
    Title,
    SplashImage,
    Icon,
    Chain,
    MainClass,
    ExecJar,
    Include,
    ClassPath,
    Property,
    HeapSize,
    JvmArg,
    Arguments,
    NativeLib,
    Set,
    When,
}

impl Directive {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Some(match keyword {
            "require" => Directive::Require,
            "rel" => Directive::Rel,
            "validate" => Directive::Validate,
            "title" => Directive::Title,
            "splash-image" => Directive::SplashImage,
            "icon" => Directive::Icon,
            "chain" => Directive::Chain,
            "main-class" => Directive::MainClass,
            "exec-jar" => Directive::ExecJar,
            "include" => Directive::Include,
            "class-path" => Directive::ClassPath,
            "property" => Directive::Property,
            "heap-size" => Directive::HeapSize,
            "jvm-arg" => Directive::JvmArg,
            "arguments" => Directive::Arguments,
            "native-lib" => Directive::NativeLib,
            "set" => Directive::Set,
            "when" => Directive::When,
            _ => return None,
        })
    }

    pub fn usage(self) -> &'static str {
        match self {
            Directive::Require => "require MAJOR.MINOR",
            Directive::Rel => "rel URI",
            Directive::Validate => "validate VALIDATOR...",
            Directive::Title => "title TITLE",
            Directive::SplashImage => "splash-image URL",
            Directive::Icon => "icon URL",
            Directive::Chain => "chain URL",
            Directive::MainClass => "main-class CLASS-NAME",
            Directive::ExecJar => "exec-jar URL",
            Directive::Include => "include URL",
            Directive::ClassPath => "class-path URL",
            Directive::Property => "property NAME VALUE",
            Directive::HeapSize => "heap-size MBYTES",
            Directive::JvmArg => "jvm-arg ARG...",
            Directive::Arguments => "arguments ARG...",
            Directive::NativeLib => "native-lib OS ARCH URL",
            Directive::Set => "set VARIABLE VALUE",
            Directive::When => "when TEST... : DIRECTIVE...",
        }
    }

    /// Minimum word count, keyword included.
    fn min_words(self) -> usize {
        match self {
            Directive::When => 1,
            Directive::Property | Directive::Set => 3,
            Directive::NativeLib => 4,
            _ => 2,
        }
    }

    fn keyword(self) -> &'static str {
        self.usage().split(' ').next().unwrap_or_default()
    }
}

/// Interprets launch-file lines into one `LaunchDescriptor`.
pub struct Interpreter {
    descriptor: LaunchDescriptor,
    properties: Arc<dyn PropertySource>,
}

impl Interpreter {
    pub fn new(properties: Arc<dyn PropertySource>) -> Self {
        Self::with_descriptor(LaunchDescriptor::new(), properties)
    }

    /// Continue filling an existing descriptor, e.g. for included files.
    pub fn with_descriptor(descriptor: LaunchDescriptor, properties: Arc<dyn PropertySource>) -> Self {
        Self {
            descriptor,
            properties,
        }
    }

    pub fn descriptor(&self) -> &LaunchDescriptor {
        &self.descriptor
    }

    pub fn into_descriptor(self) -> LaunchDescriptor {
        self.descriptor
    }

    fn expand(&self, word: &str, env: &Environment) -> LauncherResult<String> {
        expand(word, env, self.properties.as_ref())
    }

    /// Read a whole launch file, threading the environment across lines.
    ///
    /// Any failure aborts the read and carries the line number and text.
    pub fn read<R: BufRead>(&mut self, input: R, mut env: Environment) -> LauncherResult<Environment> {
        for (idx, line) in input.lines().enumerate() {
            let line = line?;
            if is_comment_or_blank(&line) {
                continue;
            }
            let at_line = |source: LauncherError| LauncherError::AtLine {
                line: idx + 1,
                text: line.clone(),
                source: Box::new(source),
            };
            let words = split_words(&line).map_err(at_line)?;
            env = self.command(&words, env).map_err(at_line)?;
        }
        Ok(env)
    }

    /// Execute one directive and return the environment for the next line.
    ///
    /// Unknown keywords are ignored so that newer launch files still load.
    pub fn command(&mut self, words: &[String], env: Environment) -> LauncherResult<Environment> {
        let Some(keyword) = words.first() else {
            return Ok(env);
        };
        let Some(directive) = Directive::from_keyword(keyword) else {
            warn!("Ignoring unknown directive `{}`", keyword);
            return Ok(env);
        };
        if words.len() < directive.min_words() {
            return Err(LauncherError::Usage {
                directive: keyword.clone(),
                usage: directive.usage(),
                source: None,
            });
        }
        trace!("Directive {:?}: {:?}", directive, words);

        let usage = |e: LauncherError| e.into_usage(directive.keyword(), directive.usage());
        let args = &words[1..];

        match directive {
            Directive::Require => {
                let ver = self.expand(&args[0], &env)?;
                let (maj, min) = parse_version(&ver).map_err(usage)?;
                if maj != MAJOR_VERSION || min > MINOR_VERSION {
                    return Err(LauncherError::IncompatibleVersion {
                        required_major: maj,
                        required_minor: min,
                        major: MAJOR_VERSION,
                        minor: MINOR_VERSION,
                    });
                }
                Ok(env)
            }
            Directive::Rel => {
                let uri = self.expand(&args[0], &env)?;
                let base = env.resolve_uri(&uri).map_err(usage)?;
                debug!("Base reference is now {}", base);
                Ok(env.with_base(base))
            }
            Directive::Validate => {
                let mut validators = Vec::new();
                for spec in args {
                    if let Some(v) = Validator::parse(&self.expand(spec, &env)?).map_err(usage)? {
                        validators.push(v);
                    }
                }
                Ok(env.with_validators(Arc::from(validators)))
            }
            Directive::Title => {
                let title = self.expand(&args[0], &env)?;
                self.descriptor.title = Some(title);
                Ok(env)
            }
            Directive::MainClass => {
                let main_class = self.expand(&args[0], &env)?;
                self.descriptor.main_class = Some(main_class);
                Ok(env)
            }
            Directive::SplashImage
            | Directive::Icon
            | Directive::Chain
            | Directive::ExecJar
            | Directive::Include
            | Directive::ClassPath => {
                let uri = self.expand(&args[0], &env)?;
                let res = env.resource(&uri).map_err(usage)?;
                let desc = &mut self.descriptor;
                match directive {
                    Directive::SplashImage => desc.splash_image = Some(res),
                    Directive::Icon => desc.icon = Some(res),
                    Directive::Chain => desc.chain = Some(res),
                    Directive::ExecJar => desc.exec_jar = Some(res),
                    Directive::Include => desc.include.push(res),
                    _ => desc.classpath.push(res),
                }
                Ok(env)
            }
            Directive::Property => {
                let name = self.expand(&args[0], &env)?;
                let value = self.expand(&args[1], &env)?;
                self.descriptor.sysprops.insert(name, value);
                Ok(env)
            }
            Directive::HeapSize => {
                let text = self.expand(&args[0], &env)?;
                let mbytes = text
                    .parse::<i32>()
                    .map_err(|source| LauncherError::MalformedInteger { text, source })
                    .map_err(usage)?;
                self.descriptor.heap_size = mbytes;
                Ok(env)
            }
            Directive::JvmArg | Directive::Arguments => {
                let expanded = args
                    .iter()
                    .map(|arg| self.expand(arg, &env))
                    .collect::<LauncherResult<Vec<_>>>()?;
                let target = if directive == Directive::JvmArg {
                    &mut self.descriptor.jvm_args
                } else {
                    &mut self.descriptor.cmd_args
                };
                target.extend(expanded);
                Ok(env)
            }
            Directive::NativeLib => {
                let uri = self.expand(&args[2], &env)?;
                let res = env.resource(&uri).map_err(usage)?;
                let lib = NativeLib::new(&args[0], &args[1], res).map_err(usage)?;
                self.descriptor.libraries.push(lib);
                Ok(env)
            }
            Directive::Set => {
                let name = self.expand(&args[0], &env)?;
                let value = self.expand(&args[1], &env)?;
                Ok(env.with_parameter(name, value))
            }
            Directive::When => {
                let cond = Conditional::parse(words).map_err(|e| match e {
                    LauncherError::MalformedPattern(_) => usage(e),
                    other => other,
                })?;
                if cond.holds(&env, self.properties.as_ref())? {
                    self.command(cond.body(), env)
                } else {
                    debug!("Condition false, skipping: {}", words.join(" "));
                    Ok(env)
                }
            }
        }
    }
}

fn parse_version(ver: &str) -> LauncherResult<(u32, u32)> {
    let malformed = || LauncherError::MalformedVersion(ver.to_string());
    let (maj, min) = ver.split_once('.').ok_or_else(malformed)?;
    Ok((
        maj.parse().map_err(|_| malformed())?,
        min.parse().map_err(|_| malformed())?,
    ))
}
