use crate::infra::{InMemoryApplicationRepository, InMemoryMessageStore};
use clap::Args;
use credit_desk::applications::{
    ApplicantDetails, ApplicationIdGenerator, CreditApplicationService, IntakeConfig,
    SeededSuffixSource, TransitionPolicy,
};
use credit_desk::clock::SystemClock;
use credit_desk::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Enforce the strict transition policy during the walkthrough.
    #[arg(long)]
    pub(crate) strict: bool,
    /// Seed for the identifier draws so repeated runs print the same ids.
    #[arg(long, default_value_t = 7)]
    pub(crate) seed: u64,
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { strict, seed } = args;

    let policy = if strict {
        TransitionPolicy::Strict
    } else {
        TransitionPolicy::Permissive
    };
    let config = IntakeConfig::default();

    println!("Credit application walkthrough ({policy} transitions)");

    let repository = Arc::new(InMemoryApplicationRepository::default());
    let messages = Arc::new(InMemoryMessageStore::default());
    let ids = ApplicationIdGenerator::new(
        config.id_prefix.clone(),
        config.max_id_attempts,
        Box::new(SeededSuffixSource::new(seed)),
    );
    let service = CreditApplicationService::with_parts(
        repository,
        messages,
        ids,
        policy,
        Arc::new(SystemClock),
    );

    let record = match service.create(demo_applicant()) {
        Ok(record) => record,
        Err(err) => {
            println!("  Submission rejected: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Received application {} -> status {}",
        record.application_id, record.status
    );

    let queue = match service.list() {
        Ok(queue) => queue,
        Err(err) => {
            println!("  Review queue unavailable: {}", err);
            return Ok(());
        }
    };
    println!("- Review queue holds {} application(s)", queue.len());

    let approved = match service.update_status(&record.application_id, "approved") {
        Ok(record) => record,
        Err(err) => {
            println!("  Review failed: {}", err);
            return Ok(());
        }
    };
    println!(
        "- Approved {} at {}",
        approved.application_id,
        approved.updated_at.to_rfc3339()
    );

    if strict {
        match service.update_status(&record.application_id, "pending") {
            Ok(_) => println!("- Reopened the approved application"),
            Err(err) => println!("- Reopening blocked: {}", err),
        }
    }

    let question = match service.append_message(
        &record.application_id,
        "When will the decision letter arrive?",
        "user",
    ) {
        Ok(message) => message,
        Err(err) => {
            println!("  Message rejected: {}", err);
            return Ok(());
        }
    };
    println!("- Applicant asked: {}", question.body);

    if let Err(err) = service.append_admin_message(
        &record.application_id,
        "Approved today, the letter goes out tomorrow.",
    ) {
        println!("  Reply rejected: {}", err);
        return Ok(());
    }
    println!("- Reviewer replied");

    let thread = match service.list_messages(&record.application_id) {
        Ok(thread) => thread,
        Err(err) => {
            println!("  Thread unavailable: {}", err);
            return Ok(());
        }
    };
    println!("\nConversation");
    for message in &thread {
        println!("  [{}] {}", message.author, message.body);
    }

    let stored = match service.get(&record.application_id) {
        Ok(record) => record,
        Err(err) => {
            println!("  Lookup failed: {}", err);
            return Ok(());
        }
    };
    match serde_json::to_string_pretty(&stored) {
        Ok(json) => println!("\nStored record:\n{}", json),
        Err(err) => println!("\nStored record unavailable: {}", err),
    }

    Ok(())
}

fn demo_applicant() -> ApplicantDetails {
    ApplicantDetails {
        first_name: "Ingrid".to_string(),
        last_name: "Sollien".to_string(),
        email: "ingrid.sollien@example.no".to_string(),
        country: "Norway".to_string(),
        city: "Trondheim".to_string(),
        address: "Nedre Bakklandet 28".to_string(),
        amount: 15_000,
        months: 36,
        income: 5_100,
    }
}
