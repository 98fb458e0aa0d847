//! Creator-profile form demo
//!
//! A line-oriented event loop stands in for the UI: each command is one
//! input event against the form. Default values arrive asynchronously from
//! the placeholder API while the prompt stays interactive, and a watch
//! subscription mirrors every value change onto the diagnostic console.

mod profile;
mod remote;

use anyhow::Result;
use grappelli::SetValueOptions;
use profile::build_profile_form;
use remote::PlaceholderClient;
use serde_json::json;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn print_help() {
	println!("commands:");
	println!("  set <field> <text>   type into a field (e.g. set email user@example.com)");
	println!("  blur <field>         leave a field (first blur starts validation)");
	println!("  get <field>          print a field's current value");
	println!("  set-username         programmatic set_value with validate/dirty/touch");
	println!("  add-phone            append a row to the phone list");
	println!("  remove-phone <i>     remove a phone row (row 0 has no remove control)");
	println!("  phones               list phone rows with their stable keys");
	println!("  validate             force full validation");
	println!("  errors               print the current error map");
	println!("  values               print the whole record");
	println!("  state                print the diagnostic snapshot");
	println!("  submit               validate and submit; resets on success");
	println!("  reset                restore default values");
	println!("  quit                 exit");
}

#[tokio::main]
async fn main() -> Result<()> {
	tracing_subscriber::fmt()
		.with_env_filter(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new("info,grappelli_forms=debug")),
		)
		.init();

	let directory = Arc::new(PlaceholderClient::from_env());
	info!(base_url = directory.base_url(), "creator-profile demo starting");

	let form = build_profile_form(directory);

	// Seed defaults in the background; the prompt stays interactive.
	{
		let form = form.clone();
		tokio::spawn(async move {
			if let Err(error) = form.resolve_default_values().await {
				warn!(%error, "keeping placeholder defaults");
			}
		});
	}

	// The live subscription a mounted view would hold; torn down when the
	// task (and its watch handle) is dropped at exit.
	{
		let mut watch = form.watch();
		tokio::spawn(async move {
			while let Some(event) = watch.changed().await {
				match event.name {
					Some(name) => info!(field = %name, "value changed"),
					None => info!("record replaced"),
				}
			}
		});
	}

	let phones = form.field_array("ph_numbers");
	print_help();

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		let mut parts = line.splitn(3, ' ');
		let command = parts.next().unwrap_or_default();
		match command {
			"help" => print_help(),
			"set" => {
				let (Some(field), Some(text)) = (parts.next(), parts.next()) else {
					println!("usage: set <field> <text>");
					continue;
				};
				if form.is_disabled(field) {
					println!("{field} is disabled");
					continue;
				}
				form.input(field, json!(text)).await;
			}
			"blur" => {
				let Some(field) = parts.next() else {
					println!("usage: blur <field>");
					continue;
				};
				form.blur(field).await;
				if let Some(error) = form.error(field) {
					println!("{field}: {error}");
				}
			}
			"get" => {
				let Some(field) = parts.next() else {
					println!("usage: get <field>");
					continue;
				};
				let suffix = if form.is_disabled(field) { " (disabled)" } else { "" };
				match form.value(field) {
					Some(value) => println!("{field} = {value}{suffix}"),
					None => println!("{field} is unset{suffix}"),
				}
			}
			"set-username" => {
				form.set_value("username", json!("SET VIA SET_VALUE"), SetValueOptions::all())
					.await;
			}
			"add-phone" => {
				phones.append(json!({ "number": "" }));
				println!("{} phone rows", phones.len());
			}
			"remove-phone" => {
				let index = parts.next().and_then(|raw| raw.parse::<usize>().ok());
				let Some(index) = index else {
					println!("usage: remove-phone <index>");
					continue;
				};
				if phones.remove(index) {
					println!("removed row {index}, {} remaining", phones.len());
				} else {
					println!("row {index} cannot be removed");
				}
			}
			"phones" => {
				for row in phones.fields() {
					println!("  [{}] {} {}", row.index, row.key, row.value);
				}
			}
			"validate" => {
				let valid = form.trigger_all().await;
				println!("form is {}", if valid { "valid" } else { "invalid" });
			}
			"errors" => {
				let errors = form.errors();
				if errors.is_empty() {
					println!("no field errors");
				}
				for (path, error) in errors.iter() {
					println!("  {path}: {error}");
				}
			}
			"values" => println!("{}", serde_json::to_string_pretty(&form.values())?),
			"state" => println!("{}", serde_json::to_string_pretty(&form.snapshot())?),
			"submit" => match form.submit().await {
				Ok(data) => {
					info!("form submitted");
					println!("{}", serde_json::to_string_pretty(&data)?);
					// The view resets itself after a successful submission.
					form.reset();
				}
				Err(errors) => {
					println!("submission blocked:");
					for (path, error) in errors.iter() {
						println!("  {path}: {error}");
					}
				}
			},
			"reset" => form.reset(),
			"quit" | "exit" => break,
			other => println!("unknown command `{other}` (try `help`)"),
		}
	}

	Ok(())
}
