/*
[INPUT]:  Resolved harness configuration and a live ledger service
[OUTPUT]: Report of timed checks across every SDK operation group
[POS]:    Conformance runner - drives the SDK end to end
[UPDATE]: When SDK operations are added or their contracts change
*/

use std::future::Future;
use std::time::Instant;

use anyhow::{Context, ensure};
use chrono::Utc;
use netledger_sdk::{
    Account, AccountEnumerationQuery, ApiKeyEnumerationQuery, Entry, EntryEnumerationQuery,
    EntryInput, EntryType, EnumerationOrder, LedgerClient,
};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::HarnessConfig;
use crate::report::{CheckOutcome, Report};

/// Amounts credited to the pagination account, in creation order
pub const PAGINATION_AMOUNTS: [i64; 15] = [10, 50, 25, 75, 5, 100, 30, 15, 60, 45, 80, 20, 90, 35, 55];

const SERVICE: &str = "Service";
const ACCOUNTS: &str = "Accounts";
const ENTRIES: &str = "Entries";
const ENUMERATION: &str = "Enumeration";
const BALANCES: &str = "Balances";
const API_KEYS: &str = "API Keys";
const CLEANUP: &str = "Cleanup";

/// Connect with `config` and run every section
pub async fn run(config: &HarnessConfig) -> anyhow::Result<Report> {
    let client =
        LedgerClient::with_config(&config.endpoint, &config.api_key, config.client_config())
            .context("create ledger client")?;
    info!(endpoint = %client.base_url(), "running conformance checks");

    let report = run_with_client(&client, &config.name_prefix).await;
    client.close();
    Ok(report)
}

/// Run every section against an existing client. Accounts the run creates
/// are deleted in the cleanup section even when earlier checks fail.
pub async fn run_with_client(client: &LedgerClient, name_prefix: &str) -> Report {
    let mut report = Report::new();
    let names = Names::new(name_prefix);
    let mut created = Vec::new();

    service_section(client, &mut report).await;

    if let Some(account) = account_section(client, &names, &mut report).await {
        created.push(account.guid);
        entry_section(client, account.guid, &mut report).await;
        balance_section(client, account.guid, &mut report).await;
    }

    created.extend(enumeration_section(client, &names, &mut report).await);
    api_key_section(client, &names, &mut report).await;
    cleanup_section(client, &created, &mut report).await;

    report
}

/// Unique names for the records one run creates
struct Names {
    prefix: String,
    run_id: String,
}

impl Names {
    fn new(prefix: &str) -> Self {
        let run_id = Uuid::new_v4().simple().to_string();
        Self {
            prefix: prefix.to_string(),
            run_id: run_id[..8].to_string(),
        }
    }

    fn of(&self, kind: &str) -> String {
        format!("{} {kind} {}", self.prefix, self.run_id)
    }
}

async fn check<T, F>(report: &mut Report, section: &'static str, name: &str, fut: F) -> Option<T>
where
    F: Future<Output = anyhow::Result<T>>,
{
    let started = Instant::now();
    let result = fut.await;
    let elapsed = started.elapsed();

    let (value, detail) = match result {
        Ok(value) => {
            info!(section, check = name, elapsed_ms = elapsed.as_millis() as u64, "PASS");
            (Some(value), None)
        }
        Err(err) => {
            let detail = format!("{err:#}");
            warn!(section, check = name, error = %detail, "FAIL");
            (None, Some(detail))
        }
    };
    report.record(CheckOutcome {
        section,
        name: name.to_string(),
        passed: value.is_some(),
        elapsed,
        detail,
    });
    value
}

async fn service_section(client: &LedgerClient, report: &mut Report) {
    check(report, SERVICE, "health check", async {
        ensure!(client.service().health_check().await, "service did not answer HEAD /");
        Ok(())
    })
    .await;

    check(report, SERVICE, "get service info", async {
        let info = client.service().get_info().await?;
        info!(name = %info.name, version = %info.version, uptime = %info.uptime_formatted, "service info");
        Ok(())
    })
    .await;
}

async fn account_section(client: &LedgerClient, names: &Names, report: &mut Report) -> Option<Account> {
    let name = names.of("Account");
    let account = check(report, ACCOUNTS, "create account", async {
        let account = client.account().create(&name, Some("Created by the conformance harness")).await?;
        ensure!(account.name == name, "created account is named {:?}", account.name);
        Ok(account)
    })
    .await?;

    check(report, ACCOUNTS, "get account by guid", async {
        let fetched = client.account().get(account.guid).await?;
        ensure!(fetched.guid == account.guid, "got account {}", fetched.guid);
        ensure!(fetched.name == account.name, "got name {:?}", fetched.name);
        Ok(())
    })
    .await;

    check(report, ACCOUNTS, "get account by name", async {
        let fetched = client.account().get_by_name(&name).await?;
        ensure!(fetched.guid == account.guid, "name resolved to {}", fetched.guid);
        Ok(())
    })
    .await;

    check(report, ACCOUNTS, "account exists", async {
        ensure!(client.account().exists(account.guid).await?, "HEAD reported missing account");
        Ok(())
    })
    .await;

    check(report, ACCOUNTS, "unknown account does not exist", async {
        ensure!(!client.account().exists(Uuid::new_v4()).await?, "HEAD reported a random guid");
        Ok(())
    })
    .await;

    check(report, ACCOUNTS, "unknown account returns 404", async {
        match client.account().get(Uuid::new_v4()).await {
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
            Ok(found) => anyhow::bail!("random guid resolved to {:?}", found.name),
        }
    })
    .await;

    check(report, ACCOUNTS, "enumerate accounts by search term", async {
        let query = AccountEnumerationQuery::default()
            .with_max_results(10)
            .with_search_term(name.as_str());
        let page = client.account().enumerate(&query).await?;
        ensure!(
            page.objects().iter().any(|a| a.guid == account.guid),
            "search returned {} accounts without the new one",
            page.len()
        );
        Ok(())
    })
    .await;

    Some(account)
}

async fn entry_section(client: &LedgerClient, account: Uuid, report: &mut Report) {
    let entries = client.entry();

    let credit = check(report, ENTRIES, "add credit", async {
        Ok(entries.add_credit(account, 100, Some("Initial deposit")).await?)
    })
    .await;

    let debit = check(report, ENTRIES, "add debit", async {
        Ok(entries.add_debit(account, Decimal::new(2550, 2), Some("Service fee")).await?)
    })
    .await;

    check(report, ENTRIES, "add credits batch", async {
        let inputs = [
            EntryInput::with_description(10, "Batch credit 1"),
            EntryInput::with_description(20, "Batch credit 2"),
            EntryInput::with_description(30, "Batch credit 3"),
        ];
        let guids = entries.add_credits(account, &inputs).await?;
        ensure!(guids.len() == inputs.len(), "server returned {} guids", guids.len());
        Ok(())
    })
    .await;

    let batch_debits = check(report, ENTRIES, "add debits batch", async {
        let inputs = [
            EntryInput::with_description(5, "Batch debit 1"),
            EntryInput::with_description(10, "Batch debit 2"),
        ];
        let guids = entries.add_debits(account, &inputs).await?;
        ensure!(guids.len() == inputs.len(), "server returned {} guids", guids.len());
        Ok(guids)
    })
    .await;

    check(report, ENTRIES, "non-positive amount rejected locally", async {
        let err = entries
            .add_credit(account, 0, None)
            .await
            .err()
            .context("zero credit was accepted")?;
        ensure!(err.is_validation(), "expected a validation error, got {err}");
        Ok(())
    })
    .await;

    check(report, ENTRIES, "get all entries", async {
        let all = entries.get_all(account).await?;
        for created in credit.iter().chain(debit.iter()) {
            let hits = all.iter().filter(|e| e.guid == *created).count();
            ensure!(hits == 1, "entry {created} listed {hits} times");
        }
        Ok(())
    })
    .await;

    check(report, ENTRIES, "get pending entries", async {
        let pending = entries.get_pending(account).await?;
        ensure!(pending.iter().all(Entry::is_pending), "committed entry listed as pending");
        if let Some(credit) = credit {
            ensure!(pending.iter().any(|e| e.guid == credit), "new credit is not pending");
        }
        Ok(())
    })
    .await;

    check(report, ENTRIES, "get pending credits", async {
        let pending = entries.get_pending_credits(account).await?;
        ensure!(
            pending.iter().all(|e| e.entry_type == EntryType::Credit),
            "pending credits contain other entry types"
        );
        Ok(())
    })
    .await;

    check(report, ENTRIES, "get pending debits", async {
        let pending = entries.get_pending_debits(account).await?;
        ensure!(
            pending.iter().all(|e| e.entry_type == EntryType::Debit),
            "pending debits contain other entry types"
        );
        Ok(())
    })
    .await;

    if let Some(cancelled) = batch_debits.and_then(|guids| guids.last().copied()) {
        check(report, ENTRIES, "cancel pending entry", async {
            entries.cancel(account, cancelled).await?;
            let pending = entries.get_pending_debits(account).await?;
            ensure!(
                pending.iter().all(|e| e.guid != cancelled),
                "cancelled debit is still pending"
            );
            Ok(())
        })
        .await;
    }

    check(report, ENTRIES, "cancel unknown entry returns 404", async {
        match entries.cancel(account, Uuid::new_v4()).await {
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
            Ok(()) => anyhow::bail!("cancelling a random guid succeeded"),
        }
    })
    .await;
}

/// Returns the accounts it created so cleanup can delete them
async fn enumeration_section(client: &LedgerClient, names: &Names, report: &mut Report) -> Vec<Uuid> {
    let mut created = Vec::new();
    let entries = client.entry();

    let paged = check(report, ENUMERATION, "create pagination account", async {
        let account = client.account().create(&names.of("Pagination"), None).await?;
        let inputs: Vec<EntryInput> = PAGINATION_AMOUNTS
            .iter()
            .map(|amount| EntryInput::new(*amount))
            .collect();
        let guids = entries.add_credits(account.guid, &inputs).await?;
        ensure!(guids.len() == inputs.len(), "server returned {} guids", guids.len());
        Ok(account.guid)
    })
    .await;

    if let Some(account) = paged {
        created.push(account);

        check(report, ENUMERATION, "amount ascending pages of five", async {
            let query = EntryEnumerationQuery::default()
                .with_max_results(5)
                .with_ordering(EnumerationOrder::AmountAscending);
            let mut page = entries.enumerate(account, &query).await?;
            ensure!(
                page.objects().first().map(|e| e.amount) == Some(Decimal::from(5)),
                "first page does not start with the smallest amount"
            );

            let mut pages = 1;
            let mut last_amount = None;
            loop {
                ensure!(page.total_records == 15, "page {pages} reports {} total", page.total_records);
                ensure!(
                    page.records_remaining == 15 - 5 * pages,
                    "page {pages} reports {} remaining",
                    page.records_remaining
                );
                ensure!(page.end_of_results == (pages == 3), "page {pages} has wrong end flag");
                last_amount = page.objects().last().map(|e| e.amount).or(last_amount);
                if page.end_of_results {
                    break;
                }
                let token = page.continuation_token.clone().context("missing continuation token")?;
                page = entries.enumerate(account, &query.next_page(token)).await?;
                pages += 1;
            }
            ensure!(last_amount == Some(Decimal::from(100)), "last page does not end with the largest amount");
            Ok(())
        })
        .await;

        for (ordering, label) in [
            (EnumerationOrder::CreatedAscending, "enumerate all by creation time"),
            (EnumerationOrder::AmountDescending, "enumerate all by amount descending"),
        ] {
            check(report, ENUMERATION, label, async {
                let query = EntryEnumerationQuery::default()
                    .with_max_results(4)
                    .with_ordering(ordering);
                let all = entries.enumerate_all(account, &query).await?;
                ensure!(all.len() == 15, "collected {} entries", all.len());
                let ordered = all.windows(2).all(|pair| match ordering {
                    EnumerationOrder::CreatedAscending => pair[0].created_utc <= pair[1].created_utc,
                    EnumerationOrder::CreatedDescending => pair[0].created_utc >= pair[1].created_utc,
                    EnumerationOrder::AmountAscending => pair[0].amount <= pair[1].amount,
                    EnumerationOrder::AmountDescending => pair[0].amount >= pair[1].amount,
                });
                ensure!(ordered, "entries out of {ordering:?} order");
                Ok(())
            })
            .await;
        }

        check(report, ENUMERATION, "amount range filter", async {
            let query = EntryEnumerationQuery::default()
                .with_max_results(3)
                .with_ordering(EnumerationOrder::AmountAscending)
                .with_amount_min(20)
                .with_amount_max(60);
            let first = entries.enumerate(account, &query).await?;
            ensure!(first.total_records == 8, "filter matched {} entries", first.total_records);
            let all = entries.enumerate_all(account, &query).await?;
            ensure!(all.len() == 8, "collected {} entries", all.len());
            ensure!(
                all.iter()
                    .all(|e| e.amount >= Decimal::from(20) && e.amount <= Decimal::from(60)),
                "entry outside the amount range"
            );
            Ok(())
        })
        .await;
    }

    let empty = check(report, ENUMERATION, "empty account enumeration", async {
        let account = client.account().create(&names.of("Empty"), None).await?;
        let page = entries
            .enumerate(account.guid, &EntryEnumerationQuery::default())
            .await?;
        ensure!(page.total_records == 0, "empty account reports {} records", page.total_records);
        ensure!(page.end_of_results, "empty account page is not final");
        ensure!(page.is_empty(), "empty account returned objects");
        Ok(account.guid)
    })
    .await;
    created.extend(empty);

    created
}

async fn balance_section(client: &LedgerClient, account: Uuid, report: &mut Report) {
    let balances = client.balance();
    let entries = client.entry();

    check(report, BALANCES, "get balance", async {
        let balance = balances.get(account).await?;
        ensure!(balance.account_guid == account, "balance for {}", balance.account_guid);
        for summary in [&balance.pending_credits, &balance.pending_debits].into_iter().flatten() {
            ensure!(summary.is_consistent(), "pending summary count disagrees with its entries");
        }
        Ok(())
    })
    .await;

    check(report, BALANCES, "commit all pending", async {
        let balance = balances.commit(account, None).await?;
        ensure!(
            balance.committed_balance == balance.pending_balance,
            "committed {} != pending {} after full commit",
            balance.committed_balance,
            balance.pending_balance
        );
        let pending = entries.get_pending(account).await?;
        ensure!(pending.is_empty(), "{} entries still pending", pending.len());
        Ok(())
    })
    .await;

    check(report, BALANCES, "verify balance chain", async {
        ensure!(balances.verify(account).await?, "chain reported broken");
        Ok(())
    })
    .await;

    let committed = check(report, BALANCES, "commit selected entries", async {
        let keep = entries.add_credit(account, 50, Some("Selective commit")).await?;
        let leave = entries.add_credit(account, 75, Some("Left pending")).await?;
        balances
            .commit(account, Some(std::slice::from_ref(&keep)))
            .await?;
        let pending = entries.get_pending(account).await?;
        ensure!(pending.iter().all(|e| e.guid != keep), "committed entry still pending");
        ensure!(pending.iter().any(|e| e.guid == leave), "uncommitted entry was committed");
        Ok(keep)
    })
    .await;

    if let Some(committed) = committed {
        check(report, BALANCES, "cancel committed entry returns 409", async {
            match entries.cancel(account, committed).await {
                Err(err) if err.is_conflict() => Ok(()),
                Err(err) => Err(err.into()),
                Ok(()) => anyhow::bail!("committed entry was cancelled"),
            }
        })
        .await;
    }

    check(report, BALANCES, "balance as of now", async {
        let as_of = balances.get_as_of(account, Utc::now()).await?;
        info!(account = %account, balance = %as_of, "balance as of now");
        Ok(())
    })
    .await;

    check(report, BALANCES, "all balances include account", async {
        let all = balances.get_all().await?;
        ensure!(all.iter().any(|b| b.account_guid == account), "account missing from {} balances", all.len());
        Ok(())
    })
    .await;
}

async fn api_key_section(client: &LedgerClient, names: &Names, report: &mut Report) {
    let keys = client.api_key();

    let created = check(report, API_KEYS, "create api key", async {
        let key = keys.create(&names.of("Key"), false).await?;
        ensure!(
            key.key.as_deref().is_some_and(|k| !k.is_empty()),
            "creation response carried no key value"
        );
        ensure!(!key.is_admin, "key was created with admin rights");
        Ok(key.guid)
    })
    .await;

    check(report, API_KEYS, "enumerate api keys", async {
        let page = keys
            .enumerate(&ApiKeyEnumerationQuery::default())
            .await?;
        ensure!(
            page.objects().iter().all(|k| k.key.is_none()),
            "enumeration exposed key values"
        );
        if let Some(guid) = created {
            ensure!(
                page.has_more() || page.objects().iter().any(|k| k.guid == guid),
                "new key missing from enumeration"
            );
        }
        Ok(())
    })
    .await;

    if let Some(guid) = created {
        check(report, API_KEYS, "revoke api key", async {
            keys.revoke(guid).await?;
            Ok(())
        })
        .await;
    }
}

async fn cleanup_section(client: &LedgerClient, accounts: &[Uuid], report: &mut Report) {
    for account in accounts {
        check(report, CLEANUP, &format!("delete account {account}"), async {
            client.account().delete(*account).await?;
            ensure!(!client.account().exists(*account).await?, "account still exists");
            Ok(())
        })
        .await;
    }
}
