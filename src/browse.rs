//! Interactive terminal front end.
//!
//! Reads one command per line, turns it into `ui::Event`s and performs the
//! resulting effects through `ApiClient::dispatch`. All state lives in `ViewState`.

use colored::*;
use eyre::Result;
use std::io::Write;
use todos::ui::{Event, Filter, FormMode, Modal, ViewState};
use todos::{ApiClient, Status, Task};
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

type InputLines = Lines<BufReader<Stdin>>;

/// A command typed at the browse prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Next,
    Prev,
    Page(u32),
    Filter(Filter),
    Refresh,
    Add,
    Edit(usize),
    Toggle(usize),
    Delete(usize),
    Help,
    Quit,
}

const HELP: &str = "\
  n / p          next / previous page
  g <page>       go to page
  f <filter>     show all, pending or completed
  r              refresh
  a              add a task
  e <n>          edit task n
  t <n>          toggle task n between pending and completed
  d <n>          delete task n
  q              quit";

/// Parse one line of input.
pub fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Input::Refresh);
    };
    let arg = words.next();

    let index = |arg: Option<&str>| -> Result<usize, String> {
        arg.and_then(|a| a.parse::<usize>().ok())
            .filter(|n| *n > 0)
            .ok_or_else(|| format!("'{}' needs a task number", command))
    };

    match command {
        "n" | "next" => Ok(Input::Next),
        "p" | "prev" => Ok(Input::Prev),
        "g" | "page" => arg
            .and_then(|a| a.parse::<u32>().ok())
            .map(Input::Page)
            .ok_or_else(|| "'g' needs a page number".to_string()),
        "f" | "filter" => arg.unwrap_or("all").parse::<Filter>().map(Input::Filter),
        "r" | "refresh" => Ok(Input::Refresh),
        "a" | "add" => Ok(Input::Add),
        "e" | "edit" => index(arg).map(Input::Edit),
        "t" | "toggle" => index(arg).map(Input::Toggle),
        "d" | "delete" => index(arg).map(Input::Delete),
        "?" | "h" | "help" => Ok(Input::Help),
        "q" | "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown command '{}', type ? for help", other)),
    }
}

pub fn format_status(status: &Status) -> ColoredString {
    match status {
        Status::Pending => "pending".yellow(),
        Status::Completed => "completed".green(),
    }
}

fn render(state: &ViewState) {
    println!();
    println!(
        "{} [{}] page {} of {}",
        "Tasks".bold(),
        state.filter.as_str().cyan(),
        state.page,
        state.last_page()
    );

    if state.tasks.is_empty() {
        println!("  {}", "No tasks found.".dimmed());
        return;
    }

    for (i, task) in state.tasks.iter().enumerate() {
        println!(
            "  {:>2}. {} {} {}",
            i + 1,
            task.title,
            format_status(&task.status),
            task.id.dimmed()
        );
        println!("      {}", task.description.dimmed());
    }
}

/// Surface and clear a pending error.
fn show_error(state: &mut ViewState) {
    if let Some(message) = &state.error {
        eprintln!("{} {}", "✗".red(), message);
        state.apply(Event::DismissError);
    }
}

async fn ask(lines: &mut InputLines, label: &str) -> Result<Option<String>> {
    print!("{}", label);
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

/// Prompt for every form field. An empty answer keeps the current value.
async fn fill_form(state: &mut ViewState, client: &ApiClient, lines: &mut InputLines) -> Result<bool> {
    let Some(form) = state.form().cloned() else {
        return Ok(false);
    };

    let heading = match form.mode {
        FormMode::Create => "Add New Task",
        FormMode::Edit { .. } => "Edit Task",
    };
    println!("{}", heading.bold());

    let Some(title) = ask(lines, &format!("  Title [{}]: ", form.title)).await? else {
        return Ok(false);
    };
    if !title.trim().is_empty() {
        client.dispatch(state, Event::SetTitle(title)).await;
    }

    let Some(description) = ask(lines, &format!("  Description [{}]: ", form.description)).await? else {
        return Ok(false);
    };
    if !description.trim().is_empty() {
        client.dispatch(state, Event::SetDescription(description)).await;
    }

    loop {
        let Some(answer) = ask(lines, &format!("  Status [{}]: ", form.status)).await? else {
            return Ok(false);
        };
        let answer = answer.trim();
        if answer.is_empty() {
            break;
        }
        match answer.parse::<Status>() {
            Ok(status) => {
                client.dispatch(state, Event::SetStatus(status)).await;
                break;
            }
            Err(e) => eprintln!("{} {}", "✗".red(), e),
        }
    }

    Ok(true)
}

/// Submit the open form, offering to retry while it stays open.
async fn submit_form(state: &mut ViewState, client: &ApiClient, lines: &mut InputLines) -> Result<()> {
    client.dispatch(state, Event::SubmitForm).await;

    while state.form().is_some() {
        show_error(state);
        let retry = ask(lines, "Edit again? [Y/n] ").await?;
        let retry = matches!(retry.as_deref().map(str::trim), Some("" | "y" | "Y" | "yes"));
        if !retry || !fill_form(state, client, lines).await? {
            client.dispatch(state, Event::CloseModal).await;
            break;
        }
        client.dispatch(state, Event::SubmitForm).await;
    }

    Ok(())
}

fn nth_task(state: &ViewState, n: usize) -> Option<Task> {
    let task = state.tasks.get(n - 1).cloned();
    if task.is_none() {
        eprintln!("{} no task {} on this page", "✗".red(), n);
    }
    task
}

/// Run the interactive loop until `q` or end of input.
pub async fn run(client: ApiClient) -> Result<()> {
    println!("Connected to {} (type ? for help)", client.base_url().cyan());

    let mut state = ViewState::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    client.dispatch(&mut state, Event::Refresh).await;

    loop {
        render(&state);
        show_error(&mut state);

        let Some(line) = ask(&mut lines, "> ").await? else {
            break;
        };

        let input = match parse_input(&line) {
            Ok(input) => input,
            Err(message) => {
                eprintln!("{} {}", "✗".red(), message);
                continue;
            }
        };

        match input {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Next => client.dispatch(&mut state, Event::NextPage).await,
            Input::Prev => client.dispatch(&mut state, Event::PrevPage).await,
            Input::Page(page) => client.dispatch(&mut state, Event::GoToPage(page)).await,
            Input::Filter(filter) => client.dispatch(&mut state, Event::SelectFilter(filter)).await,
            Input::Refresh => client.dispatch(&mut state, Event::Refresh).await,
            Input::Add => {
                client.dispatch(&mut state, Event::OpenCreate).await;
                if fill_form(&mut state, &client, &mut lines).await? {
                    submit_form(&mut state, &client, &mut lines).await?;
                } else {
                    client.dispatch(&mut state, Event::CloseModal).await;
                }
            }
            Input::Edit(n) => {
                let Some(task) = nth_task(&state, n) else { continue };
                client.dispatch(&mut state, Event::OpenEdit(task)).await;
                if fill_form(&mut state, &client, &mut lines).await? {
                    submit_form(&mut state, &client, &mut lines).await?;
                } else {
                    client.dispatch(&mut state, Event::CloseModal).await;
                }
            }
            Input::Toggle(n) => {
                let Some(task) = nth_task(&state, n) else { continue };
                let status = match task.status {
                    Status::Pending => Status::Completed,
                    Status::Completed => Status::Pending,
                };
                client.dispatch(&mut state, Event::OpenEdit(task)).await;
                client.dispatch(&mut state, Event::SetStatus(status)).await;
                client.dispatch(&mut state, Event::SubmitForm).await;
                if state.form().is_some() {
                    client.dispatch(&mut state, Event::CloseModal).await;
                }
            }
            Input::Delete(n) => {
                let Some(task) = nth_task(&state, n) else { continue };
                client.dispatch(&mut state, Event::RequestDelete(task)).await;
                let question = match &state.modal {
                    Some(Modal::ConfirmDelete { title, .. }) => {
                        format!("Are you sure you want to delete \"{}\"? [y/N] ", title)
                    }
                    _ => continue,
                };
                let answer = ask(&mut lines, &question).await?;
                let event = if matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes")) {
                    Event::ConfirmDelete
                } else {
                    Event::CloseModal
                };
                client.dispatch(&mut state, event).await;
            }
        }
    }

    Ok(())
}
