use anyhow::{bail, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use friendtracker_client::feedback::{EditSession, MutationKind, MutationTracker};
use friendtracker_client::{ClientConfig, ContactStore, HttpContactService};
use friendtracker_shared::birthday::{format_date, parse_date_only};
use friendtracker_shared::{Contact, ContactPatch, NewContact, SortDirection, SortField};

#[derive(Debug, Parser)]
#[command(name = "friendtracker", version, about = "Keep track of friends and their birthdays")]
struct Cli {
    /// Base URL of the contact service (overrides FRIENDTRACKER_SERVER_URL)
    #[arg(long)]
    server: Option<String>,

    /// Access token sent as a bearer token (overrides FRIENDTRACKER_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List contacts, closest birthday first by default
    List {
        /// Column to sort by
        #[arg(long, default_value_t = SortField::Birthday)]
        sort: SortField,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        /// Include archived contacts
        #[arg(long)]
        archived: bool,
    },
    /// Show a single contact
    Show { id: i64 },
    /// Add a contact
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Birthday as YYYY-MM-DD
        #[arg(long, value_parser = birthday_arg)]
        birthday: Option<NaiveDate>,
    },
    /// Change some details of a contact
    Edit {
        id: i64,
        #[arg(long)]
        name: Option<String>,
        /// New email; pass an empty value to clear it
        #[arg(long)]
        email: Option<String>,
        /// New phone; pass an empty value to clear it
        #[arg(long)]
        phone: Option<String>,
        #[arg(long, value_parser = birthday_arg, conflicts_with = "clear_birthday")]
        birthday: Option<NaiveDate>,
        #[arg(long)]
        clear_birthday: bool,
    },
    /// Hide a contact from the default list
    Archive { id: i64 },
    /// Bring an archived contact back
    Unarchive { id: i64 },
    /// Delete a contact permanently
    Delete { id: i64 },
}

fn birthday_arg(value: &str) -> Result<NaiveDate, String> {
    match parse_date_only(value) {
        Ok(Some(date)) => Ok(date),
        Ok(None) => Err("birthday must not be empty".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    friendtracker_client::init_tracing("friendtracker_client=info,warn");

    let cli = Cli::parse();
    let config = ClientConfig::from_env().with_overrides(cli.server, cli.token);
    tracing::debug!(?config, "Loaded client configuration");

    let service = HttpContactService::from_config(&config);

    match cli.command {
        Command::List {
            sort,
            desc,
            archived,
        } => {
            let store = ContactStore::new(service).with_show_archived(archived);
            let direction = if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            };
            store.set_sorting(sort, direction);
            store.refresh().await;
            print_list(&store.contacts(), Local::now().date_naive());
        }
        Command::Show { id } => {
            let store = ContactStore::new(service).with_show_archived(true);
            store.refresh().await;
            match store.get(id) {
                Some(contact) => print_contact(&contact, Local::now().date_naive()),
                None => bail!("Contact Not Found"),
            }
        }
        Command::Add {
            name,
            email,
            phone,
            birthday,
        } => {
            let mut contact = NewContact::new(name)?.with_birthday(birthday);
            if let Some(email) = email {
                contact = contact.with_email(email);
            }
            if let Some(phone) = phone {
                contact = contact.with_phone(phone);
            }
            let store = ContactStore::new(service);
            let created = run(MutationKind::Create, store.create(contact)).await?;
            println!("id: {}", created.id);
        }
        Command::Edit {
            id,
            name,
            email,
            phone,
            birthday,
            clear_birthday,
        } => {
            let mut patch = ContactPatch::default();
            if let Some(name) = name {
                patch = patch.name(name);
            }
            if let Some(email) = email {
                patch = patch.email(Some(email));
            }
            if let Some(phone) = phone {
                patch = patch.phone(Some(phone));
            }
            if birthday.is_some() || clear_birthday {
                patch = patch.birthday(birthday);
            }
            if patch.is_empty() {
                bail!("Nothing to change");
            }

            let store = ContactStore::new(service);
            let edit = EditSession::new();
            edit.begin();
            let result = edit.save(&store, id, patch).await;
            if let Some(message) = edit.tracker().message() {
                println!("{message}");
            }
            let updated = result?;
            print_contact(&updated, Local::now().date_naive());
        }
        Command::Archive { id } => {
            let store = ContactStore::new(service);
            run(MutationKind::Archive, store.archive(id)).await?;
        }
        Command::Unarchive { id } => {
            let store = ContactStore::new(service);
            run(MutationKind::Unarchive, store.unarchive(id)).await?;
        }
        Command::Delete { id } => {
            let store = ContactStore::new(service);
            run(MutationKind::Delete, store.delete(id)).await?;
        }
    }

    Ok(())
}

/// Run a mutation and print its pending and final status lines.
async fn run<T, E>(kind: MutationKind, mutation: impl std::future::Future<Output = Result<T, E>>) -> Result<T>
where
    E: std::error::Error + Send + Sync + 'static,
{
    let tracker = MutationTracker::new(kind);
    eprintln!("{}", kind.pending_message());
    let result = tracker.run(mutation).await;
    if let Some(message) = tracker.message() {
        println!("{message}");
    }
    Ok(result?)
}

fn birthday_cell(contact: &Contact, today: NaiveDate) -> (String, String) {
    match contact.birthday {
        Some(birthday) => {
            let days = contact.days_until_birthday(today).unwrap_or_default();
            let until = match days {
                0 => "today".to_string(),
                1 => "tomorrow".to_string(),
                n => format!("in {n} days"),
            };
            (format_date(birthday), until)
        }
        None => ("-".to_string(), String::new()),
    }
}

fn print_list(contacts: &[Contact], today: NaiveDate) {
    if contacts.is_empty() {
        println!("No contacts found. Add your first contact to get started!");
        return;
    }

    println!(
        "{:>5}  {:<24} {:<28} {:<16} {:<10} {}",
        "ID", "NAME", "EMAIL", "PHONE", "BIRTHDAY", "NEXT"
    );
    for contact in contacts {
        let (birthday, until) = birthday_cell(contact, today);
        let name = if contact.archived {
            format!("{} (archived)", contact.name)
        } else {
            contact.name.clone()
        };
        println!(
            "{:>5}  {:<24} {:<28} {:<16} {:<10} {}",
            contact.id,
            name,
            contact.email.as_deref().unwrap_or("-"),
            contact.phone.as_deref().unwrap_or("-"),
            birthday,
            until
        );
    }
}

fn print_contact(contact: &Contact, today: NaiveDate) {
    let (birthday, until) = birthday_cell(contact, today);
    println!("id:       {}", contact.id);
    println!("name:     {}", contact.name);
    println!("email:    {}", contact.email.as_deref().unwrap_or("-"));
    println!("phone:    {}", contact.phone.as_deref().unwrap_or("-"));
    if until.is_empty() {
        println!("birthday: {birthday}");
    } else {
        println!("birthday: {birthday} ({until})");
    }
    println!("archived: {}", if contact.archived { "yes" } else { "no" });
}
