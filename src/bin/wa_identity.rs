use std::collections::BTreeMap;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::json;

use wa_identity::{
    BackendConfig, GroupSession, HttpBackend, Identity, IdentityCache,
    IdentityHydrator, Jid,
};

#[derive(Parser, Debug)]
#[command(name = "wa-identity")]
#[command(about = "Resolve WhatsApp contact and group identities", long_about = None)]
struct Cli {
    /// Backend origin; overrides WA_IDENTITY_API_BASE_URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Owner scope sent along with every lookup
    #[arg(long, global = true)]
    owner: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve display names and avatars for a list of JIDs
    Identities {
        #[arg(required = true)]
        jids: Vec<Jid>,
    },
    /// Load a group's metadata and its participants' identities
    Group { chat_id: String },
}

fn lookup(
    cache: &IdentityCache,
    jids: impl IntoIterator<Item = String>,
) -> BTreeMap<String, Option<Identity>> {
    jids.into_iter()
        .map(|jid| {
            let identity = cache.get(&jid);
            (jid, identity)
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Cli::parse();

    let mut config = BackendConfig::from_env()?;
    if let Some(base_url) = &args.base_url {
        config = config.with_base_url(base_url)?;
    }
    log::info!("Using backend at {}", config.base_url());

    let backend = Arc::new(HttpBackend::new(&config)?);
    let cache = Arc::new(IdentityCache::new());
    let hydrator = IdentityHydrator::new(backend, cache.clone());
    let owner = args.owner.as_deref();

    let output = match args.command {
        Command::Identities { jids } => {
            let jids: Vec<String> = jids.iter().map(Jid::to_string).collect();
            let written = hydrator
                .hydrate_identities(&jids, owner)
                .await;
            log::info!("{} of {} identities resolved", written, jids.len());
            json!({ "identities": lookup(&cache, jids) })
        }
        Command::Group { chat_id } => {
            let session = GroupSession::new(hydrator, &chat_id, owner);
            let view = session.load().await;
            let participants = view
                .meta
                .as_ref()
                .map(|meta| meta.participant_jids())
                .unwrap_or_default();
            json!({
                "chat_id": chat_id,
                "meta": view.meta,
                "participants": lookup(&cache, participants),
            })
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
