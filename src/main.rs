use std::process::ExitCode;

use totp_codex::{Entry, FileStore, Ledger};

fn main() -> ExitCode {
    env_logger::init();

    let Some(uri) = std::env::args().nth(1) else {
        eprintln!("usage: totp-codex <otpauth://totp/...>");
        return ExitCode::FAILURE;
    };
    let entry = match Entry::from_uri(&uri) {
        Ok(entry) => entry,
        Err(e) => {
            eprintln!("bad provisioning URI: {e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match entry.generate_current() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("system clock error: {e}");
            return ExitCode::FAILURE;
        }
    };
    let ttl = entry.ttl().unwrap_or_default();
    println!("{} ({}) -> {} [{}s left]", entry.issuer, entry.account_name, code, ttl);

    let store = match FileStore::open_default() {
        Ok(store) => store,
        Err(e) => {
            eprintln!("cannot open data directory: {e}");
            return ExitCode::FAILURE;
        }
    };
    let mut ledger = Ledger::open(store);
    if let Some(seq) = ledger.observe(&code) {
        println!(
            "collected: {} \"{}\" ({} time{})",
            seq.rarity,
            seq.description,
            seq.count,
            if seq.count == 1 { "" } else { "s" }
        );
    }
    for achievement in ledger.achievements().iter().filter(|a| a.unlocked) {
        if let Some(at) = achievement.unlocked_at {
            println!("{} {} - unlocked {}", achievement.icon, achievement.name, at);
        }
    }

    ExitCode::SUCCESS
}
