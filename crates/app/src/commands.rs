use std::io::{self, BufRead, Write};

use coach_core::level_test::{Advance, AnswerOutcome};
use coach_core::model::scenario::{find_scenario, scenarios, scenarios_in};
use coach_core::model::{CefrLevel, ConversationRecord, Placement};
use services::AppServices;

use crate::Command;

type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub async fn execute(services: &AppServices, command: Command) -> CommandResult {
    match command {
        Command::LevelTest => level_test(services).await,
        Command::Vocab { level, count, save } => vocab(services, level, count, save).await,
        Command::Review { word, quality } => {
            let state = services.reviews().review(&word, quality).await?;
            services.progress().record_activity().await?;
            println!(
                "{word}: next review {} (interval {} days, ease {:.2}, repetitions {})",
                state.next_review_date(),
                state.interval_days(),
                state.ease_factor(),
                state.repetitions()
            );
            Ok(())
        }
        Command::Due => {
            let due = services.reviews().due_words().await?;
            if due.is_empty() {
                println!("Nothing due today.");
            }
            for item in due {
                println!("{:<16} {}", item.word(), item.meaning());
            }
            Ok(())
        }
        Command::Chat {
            scenario,
            new,
            message,
        } => chat(services, &scenario, new, &message).await,
        Command::History { scenario } => {
            let records = services.conversations().history(&scenario).await?;
            if records.is_empty() {
                println!("No saved dialogues for {scenario}.");
            }
            for record in records {
                println!(
                    "{}  {}  {} turns  {}",
                    record.id,
                    record.timestamp.format("%Y-%m-%d %H:%M"),
                    record.turns.len(),
                    record.preview()
                );
            }
            Ok(())
        }
        Command::Forget { id } => {
            if services.conversations().forget(&id).await? {
                println!("Deleted {id}.");
            } else {
                println!("No dialogue with id {id}.");
            }
            Ok(())
        }
        Command::Scenarios { category } => {
            let list: Vec<_> = match category {
                Some(category) => scenarios_in(category).collect(),
                None => scenarios().iter().collect(),
            };
            for scenario in list {
                println!(
                    "{:<20} {:<10} {}",
                    scenario.id,
                    scenario.category.as_str(),
                    scenario.title
                );
            }
            Ok(())
        }
        Command::Write { text } => {
            let record = services.writing().correct(&text).await?;
            if record.corrected == record.original {
                println!("No changes needed.");
            } else {
                println!("{}", record.corrected);
            }
            if !record.feedback.is_empty() {
                println!();
                println!("{}", record.feedback);
            }
            Ok(())
        }
        Command::Sentences => {
            let history = services.writing().history().await?;
            if history.is_empty() {
                println!("No corrected writing yet.");
            }
            for record in history {
                println!("{}  {}", record.timestamp.format("%Y-%m-%d %H:%M"), record.original);
                println!("    -> {}", record.corrected);
            }
            Ok(())
        }
        Command::Progress => {
            let progress = services.progress().progress().await?;
            println!(
                "Streak: {} days (practised on {} days)",
                progress.streak, progress.total_days
            );
            match services.progress().user_level().await? {
                Some(result) => println!(
                    "Level: {} (score {}, tested {})",
                    result.placement, result.score, result.date
                ),
                None => println!("Level: not tested yet"),
            }
            let words = services.reviews().words().await?.len();
            println!("Saved words: {words}");
            let sentences = services.writing().history().await?.len();
            println!("Corrected sentences: {sentences}");
            Ok(())
        }
        Command::Reset => {
            services.progress().clear_all().await?;
            println!("All learner data deleted.");
            Ok(())
        }
    }
}

fn read_choice(max: usize) -> io::Result<Option<usize>> {
    let stdin = io::stdin();
    let mut line = String::new();
    loop {
        print!("Your answer (1-{max}): ");
        io::stdout().flush()?;
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.trim().parse::<usize>() {
            Ok(choice) if (1..=max).contains(&choice) => return Ok(Some(choice - 1)),
            _ => println!("Please enter a number between 1 and {max}."),
        }
    }
}

async fn level_test(services: &AppServices) -> CommandResult {
    let mut test = services.level_test();
    test.start()?;
    println!("Level {}", test.current_level());

    loop {
        let Some(question) = test.current_question().cloned() else {
            break;
        };
        println!();
        println!(
            "[{} {}/{}] {}",
            test.current_level(),
            test.session().current_question_index() + 1,
            test.questions_in_level(),
            question.prompt()
        );
        for (i, option) in question.options().iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }

        let Some(choice) = read_choice(question.options().len())? else {
            println!("Test abandoned.");
            return Ok(());
        };
        if let AnswerOutcome::Scored {
            correct,
            correct_index,
        } = test.answer(choice)?
        {
            if correct {
                println!("Correct!");
            } else {
                println!("Incorrect. Answer: {}", question.options()[correct_index]);
            }
        }

        match test.advance().await? {
            Advance::NextQuestion { .. } => {}
            Advance::NextLevel(level) => {
                println!();
                println!("Well done, moving up to {level}.");
            }
            Advance::Finished(placement) => {
                println!();
                report_placement(placement, test.session().score(), test.session().answered());
                services.progress().record_activity().await?;
                break;
            }
        }
    }
    Ok(())
}

fn report_placement(placement: Placement, score: u32, answered: u32) {
    println!("Your level: {placement} ({score}/{answered} correct)");
    if placement == Placement::BelowA1 {
        println!("Start with the A1 vocabulary: `vocab --level A1`.");
    }
}

async fn vocab(
    services: &AppServices,
    level: Option<String>,
    count: Option<usize>,
    save: bool,
) -> CommandResult {
    let level = match level {
        Some(level) => level,
        None => services
            .progress()
            .user_level()
            .await?
            .and_then(|result| result.placement.level())
            .unwrap_or(CefrLevel::A1)
            .to_string(),
    };

    let list = services.vocabulary().vocabulary_list(&level, count).await?;
    println!("{} words for {level} (source: {})", list.items.len(), list.source);
    for item in &list.items {
        match item.ipa() {
            Some(ipa) => println!("{} {ipa}  {}", item.word(), item.meaning()),
            None => println!("{}  {}", item.word(), item.meaning()),
        }
        if !item.example().is_empty() {
            println!("    {}", item.example());
        }
    }

    if save {
        let reviews = services.reviews();
        let mut added = 0;
        for item in list.items {
            if reviews.add_word(item).await? {
                added += 1;
            }
        }
        println!("Saved {added} new words for review.");
    }
    Ok(())
}

async fn chat(services: &AppServices, scenario: &str, new: bool, message: &str) -> CommandResult {
    let conversations = services.conversations();
    if find_scenario(scenario.trim()).is_none() {
        tracing::warn!(scenario, "scenario is not in the catalog");
    }

    let previous: Option<ConversationRecord> = if new {
        None
    } else {
        conversations.resume(scenario).await?
    };
    let record = conversations.send(scenario, previous, message).await?;
    services.progress().record_activity().await?;

    if let Some(reply) = record.turns.last() {
        println!("{}", reply.content);
    }
    println!("({}, {} turns)", record.id, record.turns.len());
    Ok(())
}
