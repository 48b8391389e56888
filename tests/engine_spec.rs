use neax::config::Config;
use neax::store::{MemoryStore, Record, Store};
use neax::{Code, Evaluation, Input, Interpreter, Mode, Registry};
use serde_json::{Value, json};
use std::sync::Arc;

const ADMIN: &str = "100";
const USER: &str = "200";
const OTHER: &str = "300";

struct Harness {
    interp: Interpreter,
    users: Arc<MemoryStore>,
    threads: Arc<MemoryStore>,
}

impl Harness {
    fn new() -> Self {
        Self::with_config(Config {
            admins: vec![ADMIN.to_string()],
            ..Config::default()
        })
    }

    fn with_config(config: Config) -> Self {
        let users = Arc::new(MemoryStore::new());
        let threads = Arc::new(MemoryStore::new());
        let base = Registry::in_memory(Arc::new(config));
        let registry = Registry::new(
            users.clone(),
            threads.clone(),
            base.global.clone(),
            base.roles.clone(),
            base.config.clone(),
        );
        Self {
            interp: Interpreter::new(Arc::new(registry)),
            users,
            threads,
        }
    }

    async fn run(&self, sender: &str, script: &str) -> Evaluation {
        self.interp.run_buffered(&Input::new(sender), script).await
    }

    async fn user(&self, id: &str) -> Value {
        Value::Object(self.users.get_item(id).await.unwrap())
    }

    async fn thread(&self, id: &str) -> Value {
        Value::Object(self.threads.get_item(id).await.unwrap())
    }
}

fn record(v: Value) -> Record {
    v.as_object().cloned().unwrap()
}

#[tokio::test]
async fn denied_write_leaves_store_untouched() {
    let h = Harness::new();
    h.users.insert(OTHER, record(json!({"money": 5})));

    let eval = h.run(USER, "uset::300 money 9000").await;
    assert_eq!(eval, Evaluation::new(Code::PermissionNeedRise, "Neax::PermissionNeedRise"));
    assert_eq!(h.user(OTHER).await, json!({"money": 5}));

    let eval = h.run(USER, "uincr::300 money 10").await;
    assert_eq!(eval.code, Code::PermissionNeedRise);
    assert_eq!(h.user(OTHER).await, json!({"money": 5}));
}

#[tokio::test]
async fn reading_own_and_foreign_records() {
    let h = Harness::new();
    h.users.insert(USER, record(json!({"money": 500})));

    let eval = h.run(USER, "uget::self money").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "Property => money\n\n500"));

    let eval = h.run(OTHER, "uget::200 money").await;
    assert_eq!(eval.code, Code::PermissionNeedRise);

    let eval = h.run(ADMIN, "uget::200 money --raw").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "500"));

    let eval = h.run(USER, "uget::self").await;
    assert_eq!(eval.code, Code::MissingOrInvalidArgs);
}

#[tokio::test]
async fn whole_record_as_json() {
    let h = Harness::new();
    h.users.insert(OTHER, record(json!({"money": 5, "name": "x"})));

    let eval = h.run(ADMIN, "uget::300 --all --json --raw").await;
    assert_eq!(eval.code, Code::Success);
    assert_eq!(serde_json::from_str::<Value>(&eval.result).unwrap(), json!({"money": 5, "name": "x"}));
}

#[tokio::test]
async fn admin_increments_someone_else() {
    let h = Harness::new();
    h.users.insert(OTHER, record(json!({"money": 500})));

    let eval = h.run(ADMIN, "uincr::300 money 100000").await;
    assert_eq!(eval.code, Code::Success);
    assert_eq!(
        eval.result,
        "Incremented money by 100000 for user [300]. New value: 100500\n{\n  \"money\": 100500\n}"
    );
    assert_eq!(h.user(OTHER).await, json!({"money": 100500}));
}

#[tokio::test]
async fn increment_rejects_bad_input() {
    let h = Harness::new();
    h.users.insert(USER, record(json!({"money": 500, "name": "Ada"})));

    let eval = h.run(USER, "uincr::self name 5").await;
    assert_eq!(
        eval,
        Evaluation::new(Code::MalformedInput, "Property name is not a number or does not exist.")
    );

    let eval = h.run(USER, "uincr::self money lots").await;
    assert_eq!(eval, Evaluation::new(Code::MalformedInput, "Invalid number provided: lots"));

    let eval = h.run(USER, "uincr::self money").await;
    assert_eq!(eval.code, Code::MissingOrInvalidArgs);

    assert_eq!(h.user(USER).await, json!({"money": 500, "name": "Ada"}));
}

#[tokio::test]
async fn set_parses_json_values() {
    let h = Harness::new();

    let eval = h.run(ADMIN, "uset::300 theme {oops").await;
    assert_eq!(eval.code, Code::ExecError);
    assert!(eval.result.starts_with("Neax::SyntaxError =\n\n"), "{}", eval.result);
    assert_eq!(h.user(OTHER).await, json!({}));

    let eval = h.run(ADMIN, r#"uset::300 settings.theme "dark""#).await;
    assert_eq!(eval.code, Code::Success);
    assert!(eval.result.starts_with("Set success [300]"));
    assert_eq!(h.user(OTHER).await, json!({"settings": {"theme": "dark"}}));

    let eval = h.run(ADMIN, "uget::300 settings theme --raw").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "dark"));
}

#[tokio::test]
async fn nested_paths_go_through_arrays() {
    let h = Harness::new();
    h.users.insert(ADMIN, record(json!({"list": [1, 2], "o": {"a": [5]}})));

    assert_eq!(h.run(ADMIN, "uget::self list 1 --raw").await, Evaluation::new(Code::Success, "2"));
    assert_eq!(h.run(ADMIN, "uget::self o.a.0 --raw").await.result, "5");

    let eval = h.run(ADMIN, "uincr::self list.0 5").await;
    assert_eq!(eval.code, Code::Success, "{}", eval.result);
    assert!(eval.result.starts_with("Incremented list.0 by 5 for user [100]. New value: 6"));

    assert_eq!(h.run(ADMIN, "uset::self o.a.0 9").await.code, Code::Success);
    assert_eq!(h.user(ADMIN).await, json!({"list": [6, 2], "o": {"a": [9]}}));
}

#[tokio::test]
async fn inspect_depth_follows_flag() {
    let h = Harness::new();
    h.users.insert(USER, record(json!({"settings": {"ui": {"theme": {"dark": true}}}})));

    let eval = h.run(USER, "uget::self settings").await;
    assert_eq!(
        eval,
        Evaluation::new(Code::Success, "Property => settings\n\n{ ui: { theme: { dark: true } } }")
    );

    let eval = h.run(USER, "uget::self settings --depth 0 --raw").await;
    assert_eq!(eval.result, "{ ui: [Object] }");

    let eval = h.run(USER, "uget::self settings --depth 1 --raw").await;
    assert_eq!(eval.result, "{ ui: { theme: [Object] } }");
}

#[tokio::test]
async fn thread_records_round_trip() {
    let h = Harness::new();
    h.threads.insert("t1", record(json!({"pot": 10, "name": "lobby"})));

    let eval = h.run(ADMIN, "tget::t1 pot --raw").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "10"));

    let eval = h.run(ADMIN, "tincr::t1 pot 5").await;
    assert_eq!(
        eval.result,
        "Incremented pot by 5 for thread [t1]. New value: 15\n{\n  \"pot\": 15\n}"
    );

    let eval = h.run(ADMIN, r#"tset::t1 rules.max 4"#).await;
    assert_eq!(eval.code, Code::Success);
    assert!(eval.result.starts_with("Set success [t1]"));
    assert_eq!(h.thread("t1").await, json!({"pot": 15, "name": "lobby", "rules": {"max": 4}}));

    // thread writes never touch user records
    assert!(h.users.is_empty());
}

#[tokio::test]
async fn thread_commands_check_permissions() {
    let h = Harness::new();
    h.threads.insert("t1", record(json!({"pot": 10})));

    assert_eq!(h.run(USER, "tget::t1 pot").await.code, Code::PermissionNeedRise);
    assert_eq!(h.run(USER, "tset::t1 pot 1").await.code, Code::PermissionNeedRise);
    assert_eq!(h.run(USER, "tincr::t1 pot 1").await.code, Code::PermissionNeedRise);

    let eval = h.run(ADMIN, "tincr::t1 missing 1").await;
    assert_eq!(
        eval,
        Evaluation::new(Code::MalformedInput, "Property missing is not a number or does not exist.")
    );
    assert_eq!(h.thread("t1").await, json!({"pot": 10}));
}

#[tokio::test]
async fn links_refuse_cycles() {
    let h = Harness::new();

    let eval = h.run(ADMIN, "ulink::300 400").await;
    assert_eq!(eval.code, Code::Success);
    assert_eq!(
        eval.result,
        "Link success [300]\n[\n  \"300\",\n  \"400\"\n]\n300 will now use uid of 400"
    );

    let eval = h.run(ADMIN, "ulink::400 300").await;
    assert_eq!(eval, Evaluation::new(Code::MalformedInput, "Circular link detected."));

    let eval = h.run(ADMIN, "ulink::300 300").await;
    assert_eq!(eval.code, Code::MalformedInput);

    let eval = h.run(USER, "ulink::self 400").await;
    assert_eq!(eval.code, Code::PermissionNeedRise);
}

#[tokio::test]
async fn unlink_and_list() {
    let h = Harness::new();
    assert_eq!(h.run(ADMIN, "links::").await, Evaluation::new(Code::MissingOrInvalidArgs, "No linked uids."));

    h.run(ADMIN, "ulink::300 400").await;
    let eval = h.run(ADMIN, "links::").await;
    assert_eq!(serde_json::from_str::<Value>(&eval.result).unwrap(), json!([["300", "400"]]));
    assert_eq!(h.run(USER, "links::").await.code, Code::Success);

    let eval = h.run(ADMIN, "uunlink::300").await;
    assert_eq!(eval.code, Code::Success);
    assert!(eval.result.ends_with("300 will no longer use uid of 300"));

    let eval = h.run(ADMIN, "uunlink::300").await;
    assert_eq!(eval, Evaluation::new(Code::MissingOrInvalidArgs, "The target has no linked uid."));
    assert_eq!(h.run(ADMIN, "links::").await.code, Code::MissingOrInvalidArgs);
}

#[tokio::test]
async fn unlink_removes_first_holder_of_shared_uid() {
    let h = Harness::new();
    h.run(ADMIN, "ulink::500 400").await;
    h.run(ADMIN, "ulink::300 400").await;

    let eval = h.run(ADMIN, "uunlink::300").await;
    assert_eq!(eval.code, Code::Success);
    assert_eq!(
        eval.result,
        "Unlink success [300]\n[\n  \"300\",\n  \"400\"\n]\n300 will no longer use uid of 500"
    );

    let eval = h.run(ADMIN, "links::").await;
    assert_eq!(serde_json::from_str::<Value>(&eval.result).unwrap(), json!([["300", "400"]]));
}

#[tokio::test]
async fn admin_links_can_be_protected() {
    let h = Harness::with_config(Config {
        admins: vec![ADMIN.to_string(), OTHER.to_string()],
        ignore_admin_links: true,
        ..Config::default()
    });

    let eval = h.run(ADMIN, "ulink::300 400").await;
    assert_eq!(
        eval,
        Evaluation::new(Code::MissingOrInvalidArgs, "Cannot modify uid link of a bot admin.")
    );
}

#[tokio::test]
async fn ranks_change_once() {
    let h = Harness::new();

    assert_eq!(h.run(ADMIN, "promote::300").await, Evaluation::new(Code::Success, "Added as admin. [300]"));
    assert_eq!(
        h.run(ADMIN, "promote::300").await,
        Evaluation::new(Code::MissingOrInvalidArgs, "Already admin. [300]")
    );

    // the new admin can write foreign records
    assert_eq!(h.run(OTHER, "uset::200 money 1").await.code, Code::Success);

    assert_eq!(h.run(ADMIN, "demote::300").await, Evaluation::new(Code::Success, "Removed as admin. [300]"));
    assert_eq!(
        h.run(ADMIN, "demote::300").await,
        Evaluation::new(Code::MissingOrInvalidArgs, "Not admin. [300]")
    );

    assert_eq!(h.run(ADMIN, "mpromote::300").await.result, "Added as moderator. [300]");
    assert_eq!(h.run(ADMIN, "mdemote::300").await.result, "Removed as moderator. [300]");

    assert_eq!(h.run(USER, "promote::self").await.code, Code::PermissionNeedRise);
    assert_eq!(
        h.run(ADMIN, "promote::replied").await,
        Evaluation::new(Code::MissingOrInvalidArgs, "Target not found.")
    );
}

#[tokio::test]
async fn help_lists_every_command() {
    let h = Harness::new();

    let eval = h.run(USER, "help::").await;
    assert_eq!(eval.code, Code::Success);
    let listed = eval.result.lines().filter(|l| l.starts_with("  ")).count();
    assert_eq!(listed, h.interp.catalog().len());
    assert!(eval.result.contains("  uincr - "));
    assert!(eval.result.ends_with("neax[example::idk] can be used to run nested neax script inline"));

    let eval = h.run(USER, "help:: nope").await;
    assert_eq!(eval, Evaluation::new(Code::CommandNotFound, "Unknown command: nope"));

    let eval = h.run(USER, "help:: uget -h").await;
    assert!(eval.result.starts_with("Usage: uget [options] <args>\n\n"));

    let eval = h.run(USER, "help:: tincr --help").await;
    assert_eq!(eval.code, Code::Success);
    assert!(eval.result.starts_with("Usage: tincr [options] <args>\n\n"));
    assert!(eval.result.contains("thread record"));

    let eval = h.run(USER, "help:: print").await;
    assert!(eval.result.starts_with("print - "));
    assert_eq!(eval.result.lines().count(), 1);
}

#[tokio::test]
async fn arg_reports_resolution() {
    let h = Harness::new();

    let eval = h.run(ADMIN, "arg::self a b --depth 3").await;
    let report: Value = serde_json::from_str(&eval.result).unwrap();
    assert_eq!(report["nsxName"], "arg");
    assert_eq!(report["nsxTarget"], ADMIN);
    assert_eq!(report["nsxAuthor"], ADMIN);
    assert_eq!(report["isAuthorAdmin"], true);
    assert_eq!(report["isAllowed"], true);
    assert_eq!(report["nsxuCreated"]["args"], json!(["a", "b"]));
    assert_eq!(report["nsxuCreated"]["flagValues"]["depth"], "3");

    let report: Value = serde_json::from_str(&h.run(ADMIN, "arg::300").await.result).unwrap();
    assert_eq!(report["isAllowed"], false);
    assert_eq!(report["nsxMod"], Value::Null);

    let report: Value = serde_json::from_str(&h.run(ADMIN, "rise arg::300").await.result).unwrap();
    assert_eq!(report["isAllowed"], true);
    assert_eq!(report["nsxMod"], "rise");

    let report: Value = serde_json::from_str(&h.run(USER, "rise arg::300").await.result).unwrap();
    assert_eq!(report["isAllowed"], false);
}

#[tokio::test]
async fn shorthand_numbers() {
    let h = Harness::new();
    h.users.insert(USER, record(json!({"money": 1000})));

    assert_eq!(h.run(USER, "num:: 5T").await, Evaluation::new(Code::Success, "5000000000000"));
    assert_eq!(h.run(USER, "num::2.5k").await.result, "2500");
    assert_eq!(h.run(USER, "num:: 50%").await.result, "500");
    assert_eq!(h.run(USER, "num:: huh").await.result, "NaN");
    assert_eq!(h.run(USER, "num::").await, Evaluation::new(Code::MissingOrInvalidArgs, "0"));
}

#[tokio::test]
async fn inline_scripts_are_spliced() {
    let h = Harness::new();
    assert_eq!(
        h.run(USER, "print::self neax[num:: 10]").await,
        Evaluation::new(Code::Success, "10")
    );
    assert_eq!(
        h.run(USER, "print::self neax[num:: 1k] and neax[num:: 2k]").await.result,
        "1000 and 2000"
    );
}

#[tokio::test]
async fn inline_failures_are_aggregated() {
    let h = Harness::new();
    let eval = h.run(USER, "print::self neax[nope::self] neax[print::self]").await;
    assert_eq!(eval.code, Code::MalformedInput);
    assert_eq!(
        eval.result,
        "Issues: \n\nNeax::CommandNotFound =\nNeax::CommandNotFound = nope\n\n\
         Neax::MissingOrInvalidArgs =\n[nothing]"
    );
}

#[tokio::test]
async fn variables_come_from_input() {
    let h = Harness::new();
    let input = Input::new(USER)
        .with_field("amount", json!(250))
        .with_field("profile", json!({"name": "Ada"}));

    let eval = h.interp.run_buffered(&input, "print::self %amount% %missing%").await;
    assert_eq!(eval.result, "250 undefined");

    let falsy = Input::new(USER)
        .with_field("z", json!(0))
        .with_field("f", json!(false));
    let eval = h.interp.run_buffered(&falsy, "print::self %z% %f%").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "undefined undefined"));

    let eval = h.interp.run_buffered(&input, "input::self profile name").await;
    assert_eq!(eval, Evaluation::new(Code::Success, "Ada"));

    let eval = h.interp.run_buffered(&input, "input::self senderID").await;
    assert_eq!(eval.result, USER);

    let eval = h.interp.run_buffered(&input, "input::self").await;
    assert_eq!(eval, Evaluation::new(Code::MissingOrInvalidArgs, "[Invalid]"));
}

#[tokio::test]
async fn unknown_names_are_not_found() {
    let h = Harness::new();

    assert_eq!(
        h.run(USER, "warp print::self hi").await,
        Evaluation::new(Code::CommandNotFound, "Neax::ModNotFound = warp")
    );
    assert_eq!(
        h.run(USER, "teleport::self").await,
        Evaluation::new(Code::CommandNotFound, "Neax::CommandNotFound = teleport")
    );
    assert_eq!(h.run(USER, "hello there").await.code, Code::CommandNotFound);
    assert_eq!(h.run(USER, "print::self").await, Evaluation::new(Code::MissingOrInvalidArgs, "[nothing]"));
}

#[tokio::test]
async fn streaming_and_buffered_agree() {
    let h = Harness::new();
    let input = Input::new(ADMIN);

    let mut streamed = Vec::new();
    let mut sink = |c: &str| streamed.push(c.to_string());
    let live = h.interp.run(&input, "ulink::300 400", &mut sink, Mode::Streaming).await;
    assert_eq!(streamed.len(), 3);
    assert_eq!(streamed.join("\n"), live.result);

    let mut composed = Vec::new();
    let mut sink = |c: &str| composed.push(c.to_string());
    let buffered = h.interp.run(&input, "ulink::300 400", &mut sink, Mode::Buffered).await;
    assert_eq!(composed, vec![buffered.result.clone()]);
    assert_eq!(buffered, live);
}
