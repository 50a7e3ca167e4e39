// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, arg, value_parser};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn type_arg() -> Arg {
    Arg::new("type")
        .long("type")
        .value_name("TYPE")
        .value_parser(["income", "expense", "savings", "transfer"])
        .help("income, expense, savings or transfer")
}

fn account_fields(cmd: Command, required_name: bool) -> Command {
    cmd.arg(arg!(--name <NAME> "Account name").required(required_name))
        .arg(arg!(--balance <AMOUNT> "Current balance"))
        .arg(arg!(--description <TEXT>))
        .arg(arg!(--icon <ICON>))
        .arg(arg!(--color <COLOR>))
        .arg(arg!(--number <NUMBER> "External account number"))
        .arg(
            Arg::new("gold")
                .long("gold")
                .value_parser(value_parser!(bool))
                .num_args(0..=1)
                .default_missing_value("true")
                .help("Account holds physical gold, valued by weight"),
        )
        .arg(arg!(--weight <GRAMS> "Gold weight in grams"))
}

fn category_fields(cmd: Command, required_name: bool) -> Command {
    cmd.arg(
        arg!(--kind <KIND> "savings or expense")
            .required(true)
            .value_parser(["savings", "expense"]),
    )
    .arg(arg!(--name <NAME>).required(required_name))
    .arg(arg!(--target <AMOUNT> "Savings target or expense budget limit"))
    .arg(arg!(--account <ACCOUNT> "Default storage account (id or name)"))
    .arg(arg!(--description <TEXT>))
    .arg(arg!(--icon <ICON>))
    .arg(arg!(--color <COLOR>))
}

fn member_fields(cmd: Command, required_name: bool) -> Command {
    cmd.arg(arg!(--name <NAME>).required(required_name))
        .arg(arg!(--role <ROLE>))
        .arg(arg!(--avatar <URL>))
}

fn tx_fields(cmd: Command, create: bool) -> Command {
    cmd.arg(type_arg().required(create))
    .arg(arg!(--amount <AMOUNT>).required(create))
    .arg(arg!(--date <DATE> "YYYY-MM-DD, defaults to today"))
    .arg(arg!(--description <TEXT>))
    .arg(arg!(--member <MEMBER> "Family member (id or name)"))
    .arg(arg!(--category <CATEGORY> "Savings or expense category (id or name)"))
    .arg(arg!(--from <ACCOUNT> "Source storage account (id or name)"))
    .arg(arg!(--to <ACCOUNT> "Destination storage account (id or name)"))
    .arg(json_flag())
}

pub fn build_cli() -> Command {
    Command::new("tabungan")
        .about("Household savings tracker: accounts, categories, transactions, gold")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("account")
                .about("Storage accounts (cash, bank, e-wallet, gold)")
                .subcommand(account_fields(Command::new("add"), true))
                .subcommand(account_fields(
                    Command::new("edit").arg(arg!(<ACCOUNT> "Id or name")),
                    false,
                ))
                .subcommand(Command::new("rm").arg(arg!(<ACCOUNT> "Id or name")))
                .subcommand(
                    Command::new("list")
                        .arg(
                            Arg::new("value")
                                .long("value")
                                .action(ArgAction::SetTrue)
                                .help("Value gold accounts at the current gold price"),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("show")
                        .arg(arg!(<ACCOUNT> "Id or name"))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Savings and expense categories")
                .subcommand(category_fields(Command::new("add"), true))
                .subcommand(category_fields(
                    Command::new("edit").arg(arg!(<CATEGORY> "Id or name")),
                    false,
                ))
                .subcommand(
                    Command::new("rm")
                        .arg(
                            arg!(--kind <KIND>)
                                .required(true)
                                .value_parser(["savings", "expense"]),
                        )
                        .arg(arg!(<CATEGORY> "Id or name")),
                )
                .subcommand(
                    Command::new("list")
                        .arg(arg!(--kind <KIND>).value_parser(["savings", "expense"]))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("member")
                .about("Family members")
                .subcommand(member_fields(Command::new("add"), true))
                .subcommand(member_fields(
                    Command::new("edit").arg(arg!(<MEMBER> "Id or name")),
                    false,
                ))
                .subcommand(Command::new("rm").arg(arg!(<MEMBER> "Id or name")))
                .subcommand(Command::new("list").arg(json_flag())),
        )
        .subcommand(
            Command::new("tx")
                .about("Transactions; balances follow every change")
                .subcommand(tx_fields(Command::new("add"), true))
                .subcommand(tx_fields(
                    Command::new("edit").arg(arg!(<ID>).value_parser(value_parser!(i64))),
                    false,
                ))
                .subcommand(Command::new("rm").arg(arg!(<ID>).value_parser(value_parser!(i64))))
                .subcommand(
                    Command::new("show")
                        .arg(arg!(<ID>).value_parser(value_parser!(i64)))
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("list")
                        .arg(type_arg())
                        .arg(arg!(--member <MEMBER>))
                        .arg(arg!(--since <DATE> "On or after YYYY-MM-DD"))
                        .arg(arg!(--until <DATE> "On or before YYYY-MM-DD"))
                        .arg(arg!(--account <ACCOUNT> "Either leg"))
                        .arg(arg!(--limit <N>).value_parser(value_parser!(usize)))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("stats")
                .about("Dashboard totals for a period")
                .arg(arg!(--since <DATE>))
                .arg(arg!(--until <DATE>))
                .arg(
                    arg!(--month <MONTH> "YYYY-MM")
                        .conflicts_with_all(["since", "until"]),
                )
                .arg(
                    Arg::new("nonzero")
                        .long("nonzero")
                        .action(ArgAction::SetTrue)
                        .help("Hide categories with nothing recorded"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("gold")
                .about("Gold price per gram")
                .subcommand(Command::new("price").arg(json_flag()))
                .subcommand(Command::new("clear-cache")),
        )
        .subcommand(
            Command::new("config")
                .about("Settings stored in the database")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set")
                        .arg(arg!(<KEY>))
                        .arg(arg!(<VALUE>)),
                ),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        arg!(--format <FORMAT>)
                            .required(true)
                            .value_parser(["csv", "json"]),
                    )
                    .arg(arg!(--out <PATH>).required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Report dangling references and shape problems"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        build_cli().debug_assert();
    }
}
