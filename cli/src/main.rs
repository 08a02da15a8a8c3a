mod commands;
mod terminal;

use commands::{CommandLine, Commands, neighbors, probe, sweep, walk};
use terminal::{logging, print, spinner};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init_logging(commands.verbose);
    let cfg = commands.config();

    let result = match commands.command {
        Commands::Walk { seed } => {
            print::header("walking the topology", cfg.quiet);
            walk::walk(seed, &cfg).await
        }
        Commands::Sweep { ref cidr } => {
            print::header("sweeping the subnet", cfg.quiet);
            sweep::sweep(cidr.as_deref(), &cfg).await
        }
        Commands::Probe { ip } => {
            print::header("probing a single host", cfg.quiet);
            probe::probe(ip, &cfg).await
        }
        Commands::Neighbors { ip } => {
            print::header("resolving neighbors", cfg.quiet);
            neighbors::neighbors(ip, &cfg).await
        }
    };

    spinner::finish();
    result
}
