//! Signup form demo
//!
//! Two fields, all structural validation delegated to a declarative
//! schema, plus a control that injects a field error manually to show the
//! two paths are indistinguishable in rendering.

mod signup;

use anyhow::Result;
use serde_json::json;
use signup::build_signup_form;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_help() {
	println!("commands:");
	println!("  set <field> <text>   type into username or email");
	println!("  blur <field>         leave a field");
	println!("  inject-error         set a manual error on username, no rule fired");
	println!("  errors               print the current error map");
	println!("  state                print the diagnostic snapshot");
	println!("  submit               validate through the schema and submit");
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

	let form = build_signup_form();
	info!("signup-schema demo starting");
	print_help();

	let mut lines = BufReader::new(tokio::io::stdin()).lines();
	while let Some(line) = lines.next_line().await? {
		let line = line.trim();
		if line.is_empty() {
			continue;
		}
		let mut parts = line.splitn(3, ' ');
		match parts.next().unwrap_or_default() {
			"help" => print_help(),
			"set" => {
				let (Some(field), Some(text)) = (parts.next(), parts.next()) else {
					println!("usage: set <field> <text>");
					continue;
				};
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
			"inject-error" => {
				form.set_error("username", "ERROR MANUAL");
				println!("username: ERROR MANUAL");
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
			"state" => println!("{}", serde_json::to_string_pretty(&form.snapshot())?),
			"submit" => match form.submit().await {
				Ok(data) => {
					info!("form submitted");
					println!("{}", serde_json::to_string_pretty(&data)?);
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
