use memberlog::{
    core::{identity::derive_member_id, registry::MemberRegistry},
    member::MemberDraft,
    shell::Shell,
};

fn run(registry: &mut MemberRegistry, script: &str) -> String {
    let mut out = Vec::new();
    Shell::new(registry, script.as_bytes(), &mut out)
        .run()
        .expect("session");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn add_search_edit_list_remove() {
    let mut registry = MemberRegistry::new();
    let id = derive_member_id("Bob", "Stone");
    let script = format!(
        "1\nBob\nStone\nbob@x.com\n\n\
         3\nbob\nSTONE\ny\nbob@new.com\n\n\
         4\n\n\
         2\nabc\n\n\
         2\n{id}\n\n\
         2\n{id}\n\n\
         q\n"
    );

    let out = run(&mut registry, &script);

    assert!(out.contains("Bob Stone was added!"));
    assert!(out.contains("Member found!"));
    assert!(out.contains("Email changed!"));
    assert!(out.contains(&format!("{id:06}\tBob Stone\tbob@new.com")));
    assert!(out.contains("Invalid input."));
    assert!(out.contains(&format!("Member: {id:06}\tBob Stone removed.")));
    assert!(out.contains("No matching ID found"));
    assert!(registry.is_empty());
}

#[test]
fn duplicate_add_is_reported_and_ignored() {
    let mut registry = MemberRegistry::new();
    registry
        .insert(MemberDraft::new("Jane", "Doe", "j@x.com"))
        .expect("insert");

    let out = run(&mut registry, "1\njane\ndoe\nother@x.com\n\nq\n");

    assert!(out.contains("Sorry, looks like 'jane doe' is already in our system."));
    assert_eq!(registry.len(), 1);
    assert_eq!(
        registry.find_by_name("Jane", "Doe").expect("find").email,
        "j@x.com"
    );
}

#[test]
fn search_miss_and_declined_edit_leave_state_alone() {
    let mut registry = MemberRegistry::new();
    registry
        .insert(MemberDraft::new("Jane", "Doe", "j@x.com"))
        .expect("insert");

    let out = run(&mut registry, "3\nJohn\nSmith\n\n3\nJane\nDoe\nn\n\nq\n");

    assert!(out.contains("Member not found: John Smith"));
    assert!(out.contains("Member found!"));
    assert!(!out.contains("Email changed!"));
    assert_eq!(
        registry.find_by_name("Jane", "Doe").expect("find").email,
        "j@x.com"
    );
}

#[test]
fn blank_name_is_prompted_again() {
    let mut registry = MemberRegistry::new();
    let out = run(&mut registry, "1\n\nAda\nLovelace\nada@x.com\n\nq\n");

    assert!(out.contains("Invalid input."));
    assert!(registry.find_by_name("Ada", "Lovelace").is_ok());
}

#[test]
fn unknown_choice_and_end_of_input_end_cleanly() {
    let mut registry = MemberRegistry::new();
    let out = run(&mut registry, "7\n\n4\n");

    assert!(out.contains("Invalid input."));
    assert!(out.contains("No members registered."));
}
