use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tokio::runtime::Handle;
use tokio::signal;
use tracing::{Level, event};
use tracing_appender::rolling;

use crate::core::common::{IpProtocol, LoggingOptions, LookupOptions, PipelineOptions, RunOptions, Transport};
use crate::core::config::Config;
use crate::core::konst::{
    APP_NAME, CLI_HEADER_MSG, CONFIG_FILE, CURRENT_DIR, DNS_PORT, LOGFILE_NAME, LOGGING_JSON, LOGGING_QUIET,
    LOOKUP_TIMEOUT, MAX_INPUT_SOURCES, QUEUE_CAPACITY, RESOLVER_WORKERS,
};
use crate::dns::client::DnsClient;
use crate::pipeline::orchestrator::Pipeline;
use crate::util::handler::log_handler;
use crate::util::message::{run_header_msg, summary_table_msg};

#[derive(Debug, Subcommand, PartialEq, Clone)]
pub enum ConfigCommand {
    /// Create configuration
    Create {
        /// Config filename.
        /// Search Path: $CWD/mlookup.toml
        #[clap(short, long, default_value = CONFIG_FILE)]
        file: String,

        /// Warning: Overwrites existing file if found in path.
        #[clap(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Debug, Subcommand, PartialEq)]
pub enum Command {
    /// Generate a mlookup configuration
    Config {
        #[clap(subcommand)]
        command: ConfigCommand,
    },

    /// Resolve every hostname in the input files
    #[command(after_help = format_examples(&[
        "mlookup resolve -o results.txt names1.txt names2.txt     # 10 resolvers",
        "mlookup resolve -o results.txt -w 2 -Q 16 names.txt      # 2 resolvers, queue of 16",
        "mlookup resolve -o results.txt --sequential names.txt    # single threaded baseline",
    ]))]
    Resolve {
        /// Input files, whitespace separated hostnames
        #[clap(required = true, display_order = 1)]
        inputs: Vec<PathBuf>,

        /// Output file, one `hostname,address` line per hostname
        #[clap(short, long, display_order = 2)]
        output: PathBuf,

        /// Resolver worker count
        #[clap(short = 'w', long, default_value_t = RESOLVER_WORKERS, display_order = 50)]
        resolvers: usize,

        /// Bounded queue capacity
        #[clap(short = 'Q', long, default_value_t = QUEUE_CAPACITY, display_order = 51)]
        queue_capacity: usize,

        /// Maximum number of input files
        #[clap(long, default_value_t = MAX_INPUT_SOURCES, display_order = 52)]
        max_sources: usize,

        /// Resolve one hostname at a time without worker threads
        #[clap(long, default_value_t = false, display_order = 53)]
        sequential: bool,

        /// Lookup timeout (in milliseconds)
        #[clap(short, long, default_value_t = LOOKUP_TIMEOUT, display_order = 60)]
        timeout: u16,

        /// IP Protocol of the reported address
        #[clap(short = 'I', long, default_value_t = IpProtocol::V4, display_order = 61)]
        ip_proto: IpProtocol,

        /// Nameserver to query instead of the system resolver
        #[clap(short, long, display_order = 62)]
        nameserver: Option<IpAddr>,

        /// Nameserver port
        #[clap(short, long, default_value_t = DNS_PORT, display_order = 63)]
        port: u16,

        /// Transport protocol used with --nameserver
        #[clap(short = 'T', long, default_value_t = Transport::default(), display_order = 64)]
        transport: Transport,

        #[clap(flatten)]
        shared_options: SharedOptions,
    },
}

#[derive(Clone, Debug, Args, PartialEq)]
pub struct SharedOptions {
    /// Config filename.
    /// Search Path: $CWD/mlookup.toml
    #[clap(short, long, default_value = CONFIG_FILE, display_order = 129)]
    pub config: String,

    // Logging options
    // --------------
    /// Logging directory
    #[clap(long, default_value = CURRENT_DIR, display_order = 320)]
    pub dir: String,

    /// Logging filename
    #[clap(long, default_value = LOGFILE_NAME, display_order = 321)]
    pub file: String,

    /// Log to file in JSON format
    #[clap(long, default_value_t = false, display_order = 322)]
    pub json: bool,

    /// Silence terminal output
    #[clap(long, default_value_t = false, display_order = 324)]
    pub quiet: bool,
}
impl Default for SharedOptions {
    fn default() -> Self {
        Self {
            config: CONFIG_FILE.to_owned(),
            dir: CURRENT_DIR.to_owned(),
            file: LOGFILE_NAME.to_owned(),
            json: LOGGING_JSON,
            quiet: LOGGING_QUIET,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "mlookup")]
#[command(bin_name = "mlookup")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "mlookup - Concurrent bulk hostname resolver", long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    command: Command,
}

impl Cli {
    pub fn init() -> Cli {
        Cli::parse()
    }

    pub async fn run(self) -> Result<()> {
        // This pulls out the shared options from the nested CLI commands.
        let shared_options = match self.command {
            Command::Config { .. } => SharedOptions::default(),
            Command::Resolve { ref shared_options, .. } => shared_options.clone(),
        };

        if !shared_options.quiet {
            println!("{CLI_HEADER_MSG}");
        }

        let file_appender = rolling::never(&shared_options.dir, &shared_options.file);
        let (logfile, _guard) = tracing_appender::non_blocking(file_appender);

        let tracer = tracing_subscriber::fmt()
            .with_env_filter(std::env::var("MLOOKUP_LOG").unwrap_or_else(|_| format!("{APP_NAME}=info")))
            .with_writer(logfile)
            .with_ansi(false)
            .with_target(true)
            .with_thread_names(true);

        if shared_options.json {
            tracer.json().init()
        } else {
            tracer.init()
        }

        let config = match Config::load(&shared_options.config)? {
            Some(config) => {
                if !shared_options.quiet {
                    println!("Using configuration file `{}`.\n", shared_options.config);
                }
                config
            }
            None => {
                if !shared_options.quiet {
                    println!(
                        "Configuration file `{}` not found. Using default configuration.\n",
                        shared_options.config
                    );
                }
                Config::default()
            }
        };

        // CLI options should override config file options.
        // If a CLI option is NOT the same as the default,
        // the option was set from the CLI. Therefore we should
        // use the CLI option. Otherwise use the config file option.
        #[rustfmt::skip]
        let logging_options = LoggingOptions {
            file: if shared_options.file != LOGFILE_NAME { shared_options.file } else { config.logging_options.file },
            dir: if shared_options.dir != CURRENT_DIR { shared_options.dir } else { config.logging_options.dir },
            json: if shared_options.json != LOGGING_JSON { shared_options.json } else { config.logging_options.json },
            quiet: if shared_options.quiet != LOGGING_QUIET { shared_options.quiet } else { config.logging_options.quiet },
        };

        match self.command {
            Command::Config { command } => {
                match command {
                    ConfigCommand::Create { file, force } => {
                        Config::generate(&file, force)?;
                    }
                }
                return Ok(());
            }
            Command::Resolve {
                inputs,
                output,
                resolvers,
                queue_capacity,
                max_sources,
                sequential,
                timeout,
                ip_proto,
                nameserver,
                port,
                transport,
                shared_options: _,
            } => {
                #[rustfmt::skip]
                let pipeline_options = PipelineOptions {
                    resolvers: if resolvers != RESOLVER_WORKERS { resolvers } else { config.pipeline_options.resolvers },
                    queue_capacity: if queue_capacity != QUEUE_CAPACITY { queue_capacity } else { config.pipeline_options.queue_capacity },
                    max_sources: if max_sources != MAX_INPUT_SOURCES { max_sources } else { config.pipeline_options.max_sources },
                    sequential: if sequential { sequential } else { config.pipeline_options.sequential },
                };

                #[rustfmt::skip]
                let lookup_options = LookupOptions {
                    timeout: if timeout != LOOKUP_TIMEOUT { timeout } else { config.lookup_options.timeout },
                    ip_protocol: if ip_proto != IpProtocol::V4 { ip_proto } else { config.lookup_options.ip_protocol },
                    nameserver: nameserver.or(config.lookup_options.nameserver),
                    port: if port != DNS_PORT { port } else { config.lookup_options.port },
                    transport: if transport != Transport::default() { transport } else { config.lookup_options.transport },
                };

                let run_options = RunOptions {
                    inputs,
                    output,
                    pipeline: pipeline_options,
                };
                log_handler(&run_header_msg(&run_options), &logging_options);

                let dns_client = DnsClient::new(lookup_options, Handle::current())?;
                let pipeline = Pipeline::new(run_options, Arc::new(dns_client), logging_options.clone())?;

                // Ctrl-C stops the workers, they are still joined before exit.
                let abort = pipeline.abort_handle();
                tokio::spawn(async move {
                    if signal::ctrl_c().await.is_ok() {
                        abort.abort();
                    }
                });

                // Workers block on locks and on lookups, keep them off the async workers.
                let summary = tokio::task::spawn_blocking(move || pipeline.run()).await??;

                event!(target: APP_NAME, Level::INFO, "{summary:?}");
                if !logging_options.quiet {
                    println!("{}", summary_table_msg(&summary));
                }
            }
        }

        Ok(())
    }
}

/// Format example commands
fn format_examples(examples: &[&str]) -> String {
    let mut result = String::from("\x1B[1;4mExamples:\x1B[0m\n");
    for example in examples {
        result.push_str(&format!("  {}\n", example));
    }
    // Forces visible blank new line.
    // Otherwise, clap strips out raw trailing whitespace.
    result.push_str("\x1B[0m\n");
    result
}
