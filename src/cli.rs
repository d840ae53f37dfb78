// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn text(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help)
}

fn required(name: &'static str, help: &'static str) -> Arg {
    text(name, help).required(true)
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .about("Daily expenses, debts, and EMI installment tracking")
        .version(clap::crate_version!())
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(category_cmd())
        .subcommand(item_cmd())
        .subcommand(expense_cmd())
        .subcommand(debt_cmd())
        .subcommand(emi_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("dashboard")
                .about("This month's spend, pending debts and active EMIs")
                .args(json_args()),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("expenses")
                    .about("Export every expense line")
                    .arg(
                        text("format", "csv|json")
                            .default_value("csv")
                            .value_parser(["csv", "json"]),
                    )
                    .arg(required("out", "Output file path")),
            ),
        )
        .subcommand(Command::new("doctor").about("Check schedule and settlement invariants"))
        .subcommand(auth_cmd())
        .subcommand(remote_cmd())
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage expense categories")
        .subcommand(Command::new("add").arg(required("name", "Category name")))
        .subcommand(Command::new("list").args(json_args()))
        .subcommand(Command::new("rm").arg(required("name", "Category name")))
}

fn item_cmd() -> Command {
    Command::new("item")
        .about("Manage items within categories")
        .subcommand(
            Command::new("add")
                .arg(required("name", "Item name"))
                .arg(required("category", "Owning category")),
        )
        .subcommand(
            Command::new("list")
                .arg(text("category", "Only items in this category"))
                .args(json_args()),
        )
        .subcommand(Command::new("rm").arg(required("name", "Item name")))
}

fn expense_cmd() -> Command {
    Command::new("expense")
        .about("Log daily expenses")
        .subcommand(
            Command::new("add")
                .about("Add an item line to a day's expenses")
                .arg(text("date", "YYYY-MM-DD (default: today)"))
                .arg(required("item", "Item name"))
                .arg(required("amount", "Amount spent")),
        )
        .subcommand(
            Command::new("show")
                .about("Lines and total for one day")
                .arg(text("date", "YYYY-MM-DD (default: today)"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("list")
                .about("Days with their totals")
                .arg(text("month", "YYYY-MM"))
                .args(json_args()),
        )
        .subcommand(Command::new("rm").about("Remove one expense line").arg(id_arg("Line id")))
}

fn debt_cmd() -> Command {
    Command::new("debt")
        .about("Track money borrowed and lent")
        .subcommand(
            Command::new("add")
                .arg(required("person", "Counterparty name"))
                .arg(required("amount", "Principal"))
                .arg(required("type", "borrowed|given"))
                .arg(text("due", "Due date YYYY-MM-DD")),
        )
        .subcommand(
            Command::new("list")
                .arg(text("person", "Case-insensitive name filter"))
                .arg(text("status", "pending|closed"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("pending")
                .about("Pending debts by outstanding amount")
                .arg(text("person", "Case-insensitive name filter"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("closed")
                .about("Closed debts grouped by month")
                .arg(text("person", "Case-insensitive name filter"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("settle")
                .about("Record a partial or full settlement")
                .arg(id_arg("Debt id"))
                .arg(required("amount", "Settlement amount"))
                .arg(text("notes", "Free-form note").default_value("")),
        )
        .subcommand(
            Command::new("summary")
                .arg(text("person", "Case-insensitive name filter"))
                .args(json_args()),
        )
        .subcommand(Command::new("persons").about("Distinct counterparties").args(json_args()))
        .subcommand(
            Command::new("show")
                .about("One debt with its settlement history")
                .arg(id_arg("Debt id"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit a pending debt")
                .arg(id_arg("Debt id"))
                .arg(text("person", "New counterparty name"))
                .arg(text("amount", "New principal"))
                .arg(text("type", "Rejected: the type is fixed at creation"))
                .arg(text("due", "New due date YYYY-MM-DD")),
        )
        .subcommand(Command::new("rm").arg(id_arg("Debt id")))
}

fn plan_args() -> [Arg; 5] {
    [
        required("start", "First due date YYYY-MM-DD"),
        required("end", "End date YYYY-MM-DD"),
        Arg::new("count")
            .long("count")
            .required(true)
            .allow_negative_numbers(true)
            .value_parser(value_parser!(i64))
            .help("Number of installments"),
        required("amount", "Amount per installment"),
        text("cadence", "monthly|spread").default_value("monthly"),
    ]
}

fn emi_cmd() -> Command {
    Command::new("emi")
        .about("EMI plans and installments")
        .subcommand(
            Command::new("add")
                .arg(required("title", "Plan title"))
                .args(plan_args()),
        )
        .subcommand(
            Command::new("preview")
                .about("Show the schedule a plan would get without saving it")
                .args(plan_args())
                .args(json_args()),
        )
        .subcommand(Command::new("list").args(json_args()))
        .subcommand(
            Command::new("show")
                .about("A plan with its installments")
                .arg(id_arg("Plan id"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("pay")
                .about("Mark an installment paid")
                .arg(
                    Arg::new("installment")
                        .long("installment")
                        .required(true)
                        .value_parser(value_parser!(i64))
                        .help("Installment id"),
                )
                .arg(text("date", "Paid date YYYY-MM-DD (default: today)")),
        )
        .subcommand(Command::new("rm").about("Delete a plan and its installments").arg(id_arg("Plan id")))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Expense reports")
        .subcommand(
            Command::new("monthly")
                .about("Twelve monthly totals for a year")
                .arg(text("year", "Year (default: current)").value_parser(value_parser!(i32)))
                .args(json_args()),
        )
        .subcommand(
            Command::new("categories")
                .about("Category breakdown for one month")
                .arg(text("year", "Year (default: current)").value_parser(value_parser!(i32)))
                .arg(
                    text("month", "Month number 1-12 (default: current)")
                        .value_parser(value_parser!(u32).range(1..=12)),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("trend")
                .about("Category, daily and monthly totals over a range")
                .arg(text("start", "From YYYY-MM-DD"))
                .arg(text("end", "To YYYY-MM-DD"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("table")
                .about("Item pivot grouped by day or month")
                .arg(required("start", "From YYYY-MM-DD"))
                .arg(required("end", "To YYYY-MM-DD"))
                .arg(
                    text("group-by", "daily|monthly")
                        .default_value("daily")
                        .value_parser(["daily", "monthly"]),
                )
                .args(json_args()),
        )
}

fn auth_cmd() -> Command {
    Command::new("auth")
        .about("Remote server session")
        .subcommand(
            Command::new("login")
                .arg(required("username", "Account name"))
                .arg(required("password", "Password"))
                .arg(text("url", "Server base URL (overrides config)")),
        )
        .subcommand(
            Command::new("register")
                .arg(required("username", "Account name"))
                .arg(required("email", "E-mail address"))
                .arg(required("password", "Password"))
                .arg(text("url", "Server base URL (overrides config)")),
        )
        .subcommand(Command::new("logout"))
        .subcommand(Command::new("status"))
}

fn remote_cmd() -> Command {
    Command::new("remote")
        .about("Talk to the remote server with the stored session")
        .subcommand(Command::new("emis").about("Plans with progress").args(json_args()))
        .subcommand(
            Command::new("pay").about("Mark a remote installment paid").arg(
                Arg::new("installment")
                    .long("installment")
                    .required(true)
                    .value_parser(value_parser!(i64)),
            ),
        )
        .subcommand(
            Command::new("settle")
                .arg(id_arg("Debt id"))
                .arg(required("amount", "Settlement amount"))
                .arg(text("notes", "Free-form note").default_value("")),
        )
        .subcommand(
            Command::new("debt-summary")
                .arg(text("person", "Case-insensitive name filter"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("monthly")
                .arg(text("year", "Year (default: current)").value_parser(value_parser!(i32)))
                .args(json_args()),
        )
}
