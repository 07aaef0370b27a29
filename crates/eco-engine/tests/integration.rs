//! Integration tests for eco-engine
//!
//! Whole pages parsed from HTML, driven through the public `Page` and
//! `Session` APIs against an in-memory site.

use eco_engine::*;
use eco_net::{MemoryFetcher, Response};

const ORIGIN: &str = "http://localhost/";

// ============================================================================
// FIXTURES
// ============================================================================

fn layout(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head><title>{title}</title></head>
<body>
  <header>
    <button class="menu-toggle" aria-expanded="false">Menu</button>
    <nav class="main-nav">
      <button class="menu-close">Fechar</button>
      <ul>
        <li><a href="index.html">Início</a></li>
        <li><a href="sobre.html">Sobre</a></li>
        <li class="dropdown">
          <button class="dropdown-toggle" aria-expanded="false">Temas</button>
          <ul class="dropdown-menu">
            <li><a href="reciclagem.html">Reciclagem</a></li>
            <li><a href="energia.html">Energia</a></li>
            <li><a href="agua.html">Água</a></li>
          </ul>
        </li>
        <li><a href="cadastro.html">Cadastro</a></li>
        <li><a href="sem-regiao.html">Arquivo</a></li>
      </ul>
    </nav>
    <button id="theme-toggle" aria-pressed="false"><span class="theme-icon">🌙</span><span class="theme-label">Modo escuro</span></button>
  </header>
  <main id="app-content" class="main-content">{content}</main>
  <footer><a href="https://example.org/">Parceiros</a></footer>
</body>
</html>"#
    )
}

const FORM: &str = r#"<h1>Cadastro</h1>
<form id="form-cadastro">
  <div class="form-group"><label for="nome">Nome</label><input id="nome" type="text"></div>
  <div class="form-group"><label for="email">E-mail</label><input id="email" type="email"></div>
  <div class="form-group"><label for="cpf">CPF</label><input id="cpf" type="text"></div>
  <div class="form-group"><label for="telefone">Telefone</label><input id="telefone" type="tel"></div>
  <div class="form-group"><label for="nascimento">Nascimento</label><input id="nascimento" type="date"></div>
  <div class="form-group"><label for="endereco">Endereço</label><input id="endereco" type="text"></div>
  <div class="form-group"><label for="cidade">Cidade</label><input id="cidade" type="text"></div>
  <div class="form-group">
    <label for="estado">Estado</label>
    <select id="estado">
      <option value="">Selecione</option>
      <option value="SP">São Paulo</option>
      <option value="RJ">Rio de Janeiro</option>
    </select>
  </div>
  <div class="form-group"><label for="cep">CEP</label><input id="cep" type="text"></div>
  <div class="form-group"><label for="senha">Senha</label><input id="senha" type="password"></div>
  <div class="form-group"><label for="confirma-senha">Confirme</label><input id="confirma-senha" type="password"></div>
  <button type="submit">Cadastrar</button>
</form>"#;

fn site() -> MemoryFetcher {
    MemoryFetcher::new()
        .page("/index.html", &layout("Início | EcoConsciência", "<h1>Bem-vindo</h1><p>Pequenas ações.</p>"))
        .page("/sobre.html", &layout("Sobre | EcoConsciência", "<h1>Sobre nós</h1>"))
        .page("/cadastro.html", &layout("Cadastro | EcoConsciência", FORM))
        .page("/reciclagem.html", &layout("Reciclagem", "<h1>Reciclagem</h1>"))
        .page(
            "/sem-titulo.html",
            r#"<body><main class="main-content"><h1>Sem título</h1></main></body>"#,
        )
        .page(
            "/sem-regiao.html",
            "<html><head><title>Arquivo</title></head><body><article><h1>Arquivo</h1></article></body></html>",
        )
        .status("/erro.html", 500, "Internal Server Error")
        .failing("/quebrado.html", "connection reset")
}

fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

fn open(path: &str) -> Session<MemoryFetcher> {
    Session::open(site(), url(path), Box::new(MemoryStorage::new()), SiteConfig::default()).unwrap()
}

fn page_with(html: &str, storage: MemoryStorage, dark: bool) -> Page {
    let url = url("index.html");
    let doc = eco_html::parse(html, url.as_str()).unwrap();
    Page::builder(doc, url).storage(Box::new(storage)).system_dark(dark).build()
}

fn page(html: &str) -> Page {
    page_with(html, MemoryStorage::new(), false)
}

fn form_page() -> Page {
    page(&layout("Cadastro", FORM))
}

fn id(page: &Page, id: &str) -> NodeId {
    page.document().get_element_by_id(id).unwrap()
}

fn sel(page: &Page, selector: &str) -> NodeId {
    page.document().query_selector(selector).unwrap()
}

fn link(page: &Page, href: &str) -> NodeId {
    sel(page, &format!(r#"a[href="{href}"]"#))
}

fn value(page: &Page, field: &str) -> String {
    page.document().tree().value(id(page, field)).unwrap()
}

fn fill_valid(page: &mut Page) {
    let fields = [
        ("nome", "Ana Silva"),
        ("email", "ana@example.com"),
        ("cpf", "12345678901"),
        ("telefone", "11987654321"),
        ("nascimento", "1990-05-12"),
        ("endereco", "Rua das Árvores, 100"),
        ("cidade", "São Paulo"),
        ("estado", "SP"),
        ("cep", "01310100"),
        ("senha", "senha123"),
        ("confirma-senha", "senha123"),
    ];
    for (field, text) in fields {
        let node = id(page, field);
        page.type_into(node, text);
    }
}

fn submit(page: &mut Page) -> ValidationReport {
    let form = id(page, FORM_ID);
    let event = page.submit(form);
    assert!(event.is_default_prevented());
    page.last_report().cloned().unwrap()
}

fn is_open_menu(page: &Page) -> bool {
    page.document().has_class(sel(page, ".main-nav"), "menu-open")
}

fn toggle_expanded(page: &Page, selector: &str) -> Option<String> {
    page.document()
        .attr(sel(page, selector), "aria-expanded")
        .map(str::to_string)
}

fn dark_applied(page: &Page) -> bool {
    page.document().has_class(page.document().body(), "dark-mode")
}

// ============================================================================
// FORM VALIDATION
// ============================================================================

#[test]
fn test_all_valid_fields_submit_successfully() {
    let mut page = form_page();
    fill_valid(&mut page);

    let report = submit(&mut page);

    assert!(report.is_valid());
    assert!(page.document().query_selector_all(".input-error").is_empty());
    assert!(page.document().query_selector_all(".error-message").is_empty());
    assert_eq!(page.notices(), &[PageNotice::RegistrationAccepted]);
}

#[test]
fn test_each_empty_required_field_fails_alone() {
    for field in field_ids().filter(|&f| f != "senha") {
        let mut page = form_page();
        fill_valid(&mut page);
        let node = id(&page, field);
        page.document_mut().tree_mut().set_value(node, "").unwrap();

        let report = submit(&mut page);

        assert_eq!(report.error_count(), 1, "{field}");
        assert!(report.error_for(field).is_some(), "{field}");
        assert_eq!(page.document().query_selector_all(".input-error"), vec![node], "{field}");
        assert!(page.notices().is_empty(), "{field}");
    }
}

#[test]
fn test_empty_password_also_breaks_confirmation() {
    let mut page = form_page();
    fill_valid(&mut page);
    let senha = id(&page, "senha");
    page.document_mut().tree_mut().set_value(senha, "").unwrap();

    let report = submit(&mut page);

    assert_eq!(report.error_for("senha"), Some("A senha é obrigatória."));
    assert_eq!(report.error_for("confirma-senha"), Some("As senhas não conferem."));
}

#[test]
fn test_required_messages() {
    let mut page = form_page();
    let report = submit(&mut page);

    assert_eq!(report.error_count(), 11);
    assert_eq!(report.error_for("email"), Some("O campo e-mail é obrigatório."));
    assert_eq!(report.error_for("cpf"), Some("O campo CPF é obrigatório."));
    assert_eq!(report.error_for("estado"), Some("Selecione um estado."));
    assert_eq!(report.error_for("confirma-senha"), Some("Confirme sua senha."));
}

#[test]
fn test_email_shape_enforced() {
    for bad in ["ana", "ana@example", "ana @example.com", "ana@exa mple.com"] {
        let mut page = form_page();
        fill_valid(&mut page);
        let email = id(&page, "email");
        page.type_into(email, bad);

        let report = submit(&mut page);
        assert_eq!(report.error_for("email"), Some("Digite um e-mail válido."), "{bad}");
    }

    let mut page = form_page();
    fill_valid(&mut page);
    let email = id(&page, "email");
    page.type_into(email, "user@example.com");
    assert!(submit(&mut page).error_for("email").is_none());
}

#[test]
fn test_short_password_rejected() {
    let mut page = form_page();
    fill_valid(&mut page);
    let (senha, confirma) = (id(&page, "senha"), id(&page, "confirma-senha"));
    page.type_into(senha, "abc1234");
    page.type_into(confirma, "abc1234");

    let report = submit(&mut page);

    assert_eq!(report.error_for("senha"), Some("A senha deve ter no mínimo 8 caracteres."));
    assert!(report.error_for("confirma-senha").is_none());
}

#[test]
fn test_padded_password_counts_whitespace() {
    let mut page = form_page();
    fill_valid(&mut page);
    let (senha, confirma) = (id(&page, "senha"), id(&page, "confirma-senha"));
    page.type_into(senha, "   abc   ");
    page.type_into(confirma, "abc");

    let report = submit(&mut page);

    assert!(report.error_for("senha").is_none());
    assert_eq!(report.error_for("confirma-senha"), Some("As senhas não conferem."));
}

#[test]
fn test_mismatched_confirmation_rejected_regardless_of_length() {
    let mut page = form_page();
    fill_valid(&mut page);
    let confirma = id(&page, "confirma-senha");
    page.type_into(confirma, "senha1234567");

    let report = submit(&mut page);

    assert!(report.error_for("senha").is_none());
    assert_eq!(report.error_for("confirma-senha"), Some("As senhas não conferem."));
}

#[test]
fn test_incomplete_masked_fields_rejected() {
    let mut page = form_page();
    fill_valid(&mut page);
    let (cpf, telefone, cep) = (id(&page, "cpf"), id(&page, "telefone"), id(&page, "cep"));
    page.type_into(cpf, "1234567890");
    page.type_into(telefone, "1198765432");
    page.type_into(cep, "0131010");

    let report = submit(&mut page);

    assert_eq!(report.error_for("cpf"), Some("CPF incompleto. Verifique os números."));
    assert_eq!(report.error_for("telefone"), Some("Telefone incompleto. Verifique os números."));
    assert_eq!(report.error_for("cep"), Some("CEP incompleto. Verifique os números."));
    assert_eq!(report.error_count(), 3);
}

#[test]
fn test_error_annotation_is_accessible() {
    let mut page = form_page();
    submit(&mut page);

    let nome = id(&page, "nome");
    let doc = page.document();
    assert!(doc.has_class(nome, "input-error"));
    assert_eq!(doc.attr(nome, "aria-invalid"), Some("true"));
    assert_eq!(doc.attr(nome, "aria-describedby"), Some("nome-error"));

    let message = doc.get_element_by_id("nome-error").unwrap();
    assert!(doc.is_tag(message, "small"));
    assert!(doc.has_class(message, "error-message"));
    assert_eq!(doc.tree().text_content(message), "Por favor, preencha seu nome completo.");
    assert_eq!(doc.tree().parent(message), doc.tree().parent(nome));
}

#[test]
fn test_repeated_failure_keeps_one_message_per_field() {
    let mut page = form_page();
    submit(&mut page);
    submit(&mut page);
    let report = submit(&mut page);

    let messages = page.document().query_selector_all(".error-message");
    assert_eq!(messages.len(), report.error_count());
    assert_eq!(page.document().query_selector_all("#nome-error").len(), 1);
}

#[test]
fn test_fixing_fields_clears_annotations() {
    let mut page = form_page();
    submit(&mut page);
    fill_valid(&mut page);
    submit(&mut page);

    let nome = id(&page, "nome");
    assert!(!page.document().has_class(nome, "input-error"));
    assert!(page.document().attr(nome, "aria-invalid").is_none());
    assert!(page.document().get_element_by_id("nome-error").is_none());
}

#[test]
fn test_show_error_updates_existing_message() {
    let mut page = form_page();
    let nome = id(&page, "nome");

    show_error(page.document_mut(), nome, "nome", "primeira").unwrap();
    show_error(page.document_mut(), nome, "nome", "segunda").unwrap();

    let messages = page.document().query_selector_all(".error-message");
    assert_eq!(messages.len(), 1);
    assert_eq!(page.document().tree().text_content(messages[0]), "segunda");
}

#[test]
fn test_missing_field_is_a_field_failure() {
    let mut page = page(
        r#"<body><main id="app-content"><form id="form-cadastro"><input id="nome" value="Ana"></form></main></body>"#,
    );
    let report = submit(&mut page);

    assert!(report.error_for("nome").is_none());
    assert_eq!(report.error_count(), 10);
    assert!(page.notices().is_empty());
}

// ============================================================================
// INPUT MASKS
// ============================================================================

#[test]
fn test_typing_formats_masked_fields() {
    let mut page = form_page();
    let (cpf, telefone, cep) = (id(&page, "cpf"), id(&page, "telefone"), id(&page, "cep"));

    page.type_into(cpf, "12345678901");
    page.type_into(telefone, "11987654321");
    page.type_into(cep, "01310100999");

    assert_eq!(value(&page, "cpf"), "123.456.789-01");
    assert_eq!(value(&page, "telefone"), "(11) 98765-4321");
    assert_eq!(value(&page, "cep"), "01310-100");
}

#[test]
fn test_partial_input_has_no_trailing_separator() {
    let mut page = form_page();
    let cpf = id(&page, "cpf");
    page.type_into(cpf, "123");
    assert_eq!(value(&page, "cpf"), "123");
    page.type_into(cpf, "123.4");
    assert_eq!(value(&page, "cpf"), "123.4");
}

#[test]
fn test_unmasked_field_untouched() {
    let mut page = form_page();
    let nome = id(&page, "nome");
    page.type_into(nome, "Ana 123");
    assert_eq!(value(&page, "nome"), "Ana 123");
}

#[test]
fn test_prefilled_value_formatted_on_load() {
    let page = page(r#"<body><input id="cep" value="01310100"></body>"#);
    assert_eq!(value(&page, "cep"), "01310-100");
}

// ============================================================================
// MENU
// ============================================================================

#[test]
fn test_menu_toggle_and_close_button() {
    let mut page = form_page();
    page.click(sel(&page, ".menu-toggle"));
    assert!(is_open_menu(&page));
    assert_eq!(toggle_expanded(&page, ".menu-toggle").as_deref(), Some("true"));

    page.click(sel(&page, ".menu-close"));
    assert!(!is_open_menu(&page));
    assert_eq!(toggle_expanded(&page, ".menu-toggle").as_deref(), Some("false"));
}

#[test]
fn test_menu_closes_on_internal_link() {
    let mut page = form_page();
    page.click(sel(&page, ".menu-toggle"));
    page.click(link(&page, "sobre.html"));
    assert!(!is_open_menu(&page));
    assert_eq!(toggle_expanded(&page, ".menu-toggle").as_deref(), Some("false"));
}

#[test]
fn test_menu_closes_on_escape_and_outside_click() {
    let mut page = form_page();
    page.click(sel(&page, ".menu-toggle"));
    page.press_key(Key::Escape);
    assert!(!is_open_menu(&page));

    page.click(sel(&page, ".menu-toggle"));
    page.click(sel(&page, "h1"));
    assert!(!is_open_menu(&page));
}

#[test]
fn test_menu_stays_open_for_nested_dropdown() {
    let mut page = form_page();
    page.click(sel(&page, ".menu-toggle"));
    page.click(sel(&page, ".dropdown-toggle"));
    assert!(is_open_menu(&page));
    assert!(any_expanded(page.document()));
}

#[test]
fn test_escape_closes_dropdown_before_menu() {
    let mut page = form_page();
    page.click(sel(&page, ".menu-toggle"));
    page.click(sel(&page, ".dropdown-toggle"));

    let event = page.press_key(Key::Escape);
    assert!(event.is_propagation_stopped());
    assert!(!any_expanded(page.document()));
    assert!(is_open_menu(&page));

    page.press_key(Key::Escape);
    assert!(!is_open_menu(&page));
}

#[test]
fn test_stray_expanded_trigger_does_not_block_escape() {
    let mut page = page(&layout(
        "Início",
        r#"<button class="dropdown-toggle" aria-expanded="true">Solto</button>"#,
    ));
    page.click(sel(&page, ".menu-toggle"));
    assert!(is_open_menu(&page));

    page.press_key(Key::Escape);
    assert!(!is_open_menu(&page));
}

#[test]
fn test_menu_without_markup_is_silent() {
    let mut page = page("<body><p>Sem menu</p></body>");
    let p = sel(&page, "p");
    page.click(p);
    page.press_key(Key::Escape);
    assert!(page.full_navigation().is_none());
}

// ============================================================================
// DROPDOWN
// ============================================================================

fn items(page: &Page) -> Vec<NodeId> {
    page.document().query_selector_all(".dropdown-menu a")
}

#[test]
fn test_trigger_keys_open_and_focus_first_item() {
    let mut page = form_page();
    let trigger = sel(&page, ".dropdown-toggle");
    let first = items(&page)[0];

    page.focus(trigger);
    let event = page.press_key(Key::Enter);
    assert!(event.is_default_prevented());
    assert_eq!(toggle_expanded(&page, ".dropdown-toggle").as_deref(), Some("true"));
    assert!(page.document().has_class(sel(&page, ".dropdown"), "open"));
    assert_eq!(page.document().active_element(), Some(first));

    page.key_down(trigger, Key::Space);
    assert_eq!(toggle_expanded(&page, ".dropdown-toggle").as_deref(), Some("false"));
}

#[test]
fn test_arrow_down_on_expanded_trigger_only_moves_focus() {
    let mut page = form_page();
    let trigger = sel(&page, ".dropdown-toggle");
    let first = items(&page)[0];

    page.key_down(trigger, Key::ArrowDown);
    assert!(any_expanded(page.document()));

    page.focus(trigger);
    page.key_down(trigger, Key::ArrowDown);
    assert!(any_expanded(page.document()));
    assert_eq!(page.document().active_element(), Some(first));
}

#[test]
fn test_arrow_down_wraps_to_first() {
    let mut page = form_page();
    let trigger = sel(&page, ".dropdown-toggle");
    let all = items(&page);
    page.click(trigger);

    page.press_key(Key::ArrowDown);
    page.press_key(Key::ArrowDown);
    assert_eq!(page.document().active_element(), Some(all[2]));

    page.press_key(Key::ArrowDown);
    assert_eq!(page.document().active_element(), Some(all[0]));
}

#[test]
fn test_arrow_up_from_first_closes_and_returns_focus() {
    let mut page = form_page();
    let trigger = sel(&page, ".dropdown-toggle");
    let all = items(&page);
    page.click(trigger);
    page.press_key(Key::ArrowDown);
    assert_eq!(page.document().active_element(), Some(all[1]));

    page.press_key(Key::ArrowUp);
    assert_eq!(page.document().active_element(), Some(all[0]));

    page.press_key(Key::ArrowUp);
    assert!(!any_expanded(page.document()));
    assert_eq!(page.document().active_element(), Some(trigger));
}

#[test]
fn test_escape_returns_focus_to_trigger() {
    let mut page = form_page();
    let trigger = sel(&page, ".dropdown-toggle");
    page.click(trigger);

    page.press_key(Key::Escape);
    assert!(!any_expanded(page.document()));
    assert_eq!(page.document().active_element(), Some(trigger));
}

#[test]
fn test_click_outside_closes_dropdown() {
    let mut page = form_page();
    page.click(sel(&page, ".dropdown-toggle"));
    page.click(sel(&page, "h1"));
    assert!(!any_expanded(page.document()));
}

#[test]
fn test_focus_leaving_closes_after_deferred_check() {
    let mut page = form_page();
    page.click(sel(&page, ".dropdown-toggle"));
    let nome = id(&page, "nome");

    page.focus(nome);
    assert!(any_expanded(page.document()), "closes only once deferred work runs");
    assert!(page.pending_tasks() > 0);

    page.run_deferred();
    assert!(!any_expanded(page.document()));
}

#[test]
fn test_focus_moving_inside_keeps_dropdown_open() {
    let mut page = form_page();
    page.click(sel(&page, ".dropdown-toggle"));
    let second = items(&page)[1];

    page.focus(second);
    page.run_deferred();
    assert!(any_expanded(page.document()));
}

#[test]
fn test_deferred_check_treats_removed_focus_as_outside() {
    let mut page = form_page();
    page.click(sel(&page, ".dropdown-toggle"));
    let first = items(&page)[0];
    assert_eq!(page.document().active_element(), Some(first));

    page.dispatch(UiEvent::new(EventKind::FocusOut, first));
    page.document_mut().tree_mut().detach(first);
    assert!(page.document().active_element().is_none());

    page.run_deferred();
    assert!(!any_expanded(page.document()));
}

// ============================================================================
// THEME
// ============================================================================

#[test]
fn test_os_dark_preference_applies_without_stored_value() {
    let page = page_with(&layout("Início", ""), MemoryStorage::new(), true);
    assert!(dark_applied(&page));

    let toggle = id(&page, "theme-toggle");
    let doc = page.document();
    assert_eq!(doc.attr(toggle, "aria-pressed"), Some("true"));
    assert_eq!(doc.tree().text_content(sel(&page, ".theme-icon")), "☀️");
    assert_eq!(doc.tree().text_content(sel(&page, ".theme-label")), "Modo claro");
}

#[test]
fn test_manual_toggle_ignores_later_os_changes() {
    let mut page = page_with(&layout("Início", ""), MemoryStorage::new(), true);
    page.click(id(&page, "theme-toggle"));

    assert!(!dark_applied(&page));
    assert_eq!(page.storage().get_item("theme").as_deref(), Some("light"));

    page.set_system_dark(false);
    page.set_system_dark(true);
    assert!(!dark_applied(&page));
}

#[test]
fn test_os_changes_followed_while_unset() {
    let mut page = page_with(&layout("Início", ""), MemoryStorage::new(), false);
    assert!(!dark_applied(&page));

    page.set_system_dark(true);
    assert!(dark_applied(&page));
    assert!(page.storage().get_item("theme").is_none());
}

#[test]
fn test_stored_preference_wins() {
    let page = page_with(&layout("Início", ""), MemoryStorage::new().with_item("theme", "dark"), false);
    assert!(dark_applied(&page));
}

#[test]
fn test_invalid_stored_value_counts_as_unset() {
    let mut page = page_with(&layout("Início", ""), MemoryStorage::new().with_item("theme", "sepia"), true);
    assert!(dark_applied(&page));

    page.set_system_dark(false);
    assert!(!dark_applied(&page));
}

#[test]
fn test_theme_applies_without_toggle() {
    let page = page_with("<body><p>Sem botão</p></body>", MemoryStorage::new().with_item("theme", "dark"), false);
    assert!(dark_applied(&page));
}

#[test]
fn test_theme_survives_full_reload_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");

    let storage = JsonFileStorage::open(&path).unwrap();
    let mut session = Session::open(site(), url("index.html"), Box::new(storage), SiteConfig::default()).unwrap();
    let toggle = id(session.page(), "theme-toggle");
    session.page_mut().click(toggle);
    assert!(dark_applied(session.page()));

    session.load(url("sobre.html")).unwrap();
    assert!(dark_applied(session.page()));
    drop(session);

    let storage = JsonFileStorage::open(&path).unwrap();
    let session = Session::open(site(), url("index.html"), Box::new(storage), SiteConfig::default()).unwrap();
    assert!(dark_applied(session.page()));
}

// ============================================================================
// CONTENT NAVIGATION
// ============================================================================

#[test]
fn test_link_click_swaps_content() {
    let mut session = open("index.html");
    session.page_mut().scroll_to(0, 480);
    let sobre = link(session.page(), "sobre.html");

    let event = session.page_mut().click(sobre);
    assert!(event.is_default_prevented());
    assert_eq!(session.page().pending_fetches(), 1);
    session.settle().unwrap();

    let page = session.page();
    assert_eq!(page.url().path(), "/sobre.html");
    assert_eq!(page.title(), "Sobre | EcoConsciência");
    assert_eq!(page.document().tree().text_content(sel(page, "h1")), "Sobre nós");
    assert_eq!(page.scroll_position(), (0, 0));
    assert_eq!(page.history().len(), 2);
    assert_eq!(page.history().current().as_str(), "http://localhost/sobre.html");
    assert_eq!(session.full_loads(), 1);
}

#[test]
fn test_fetch_carries_cache_busting_parameter() {
    let mut session = open("index.html");
    let sobre = link(session.page(), "sobre.html");
    session.page_mut().click(sobre);

    let requests = session.page_mut().take_fetch_requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].url.query_pairs().any(|(k, v)| k == "_" && !v.is_empty()));
    assert!(requests[0].target.query().is_none());
}

#[test]
fn test_same_path_only_scrolls() {
    let mut session = open("index.html");
    session.page_mut().scroll_to(0, 900);
    let inicio = link(session.page(), "index.html");

    let event = session.page_mut().click(inicio);
    session.settle().unwrap();

    assert!(event.is_default_prevented());
    assert_eq!(session.page().scroll_position(), (0, 0));
    assert_eq!(session.fetcher().request_count(), 1);
    assert_eq!(session.page().history().len(), 1);
}

#[test]
fn test_missing_region_falls_back_to_full_load() {
    let mut session = open("index.html");
    let arquivo = link(session.page(), "sem-regiao.html");
    session.page_mut().click(arquivo);

    session.settle().unwrap();

    let page = session.page();
    assert_eq!(session.full_loads(), 2);
    assert_eq!(page.url().path(), "/sem-regiao.html");
    assert_eq!(page.title(), "Arquivo");
    assert!(page.document().query_selector("article").is_some());
    assert!(page.document().query_selector("#app-content").is_none());
}

#[test]
fn test_fallback_leaves_document_untouched_until_reload() {
    let mut page = page(&layout("Início", "<h1>Bem-vindo</h1>"));
    let arquivo = link(&page, "sem-regiao.html");
    page.click(arquivo);
    let request = page.take_fetch_requests().remove(0);
    let html = site();
    let response = eco_net::Fetcher::fetch(&html, &request.url);

    let outcome = page.complete_fetch(&request, response);

    assert!(matches!(
        outcome,
        NavigationOutcome::FellBack(NavigationError::MissingRegion(RegionSide::Fetched))
    ));
    assert_eq!(page.document().tree().text_content(sel(&page, "h1")), "Bem-vindo");
    assert_eq!(page.url().path(), "/index.html");
    assert_eq!(page.history().len(), 1);
    assert_eq!(page.full_navigation().map(|u| u.path()), Some("/sem-regiao.html"));
    assert!(matches!(page.notices(), [PageNotice::NavigationFellBack { .. }]));
}

#[test]
fn test_current_document_without_region_falls_back() {
    let mut page = page(r#"<body><nav><a href="sobre.html">Sobre</a></nav></body>"#);
    page.click(link(&page, "sobre.html"));
    let request = page.take_fetch_requests().remove(0);

    let outcome = page.complete_fetch(&request, Ok(Response::html(200, layout("Sobre", "<h1>Sobre</h1>"))));

    assert!(matches!(
        outcome,
        NavigationOutcome::FellBack(NavigationError::MissingRegion(RegionSide::Current))
    ));
}

#[test]
fn test_error_status_and_transport_failure_fall_back() {
    for (path, expect_status) in [("erro.html", true), ("quebrado.html", false)] {
        let mut page = page(&layout("Início", ""));
        page.navigate_to(url(path));
        let request = page.take_fetch_requests().remove(0);
        let outcome = page.complete_fetch(&request, eco_net::Fetcher::fetch(&site(), &request.url));

        match outcome {
            NavigationOutcome::FellBack(NavigationError::HttpStatus(500)) => assert!(expect_status),
            NavigationOutcome::FellBack(NavigationError::Fetch(_)) => assert!(!expect_status),
            other => panic!("{path}: unexpected {other:?}"),
        }
        assert_eq!(page.full_navigation().map(|u| u.path().to_string()), Some(format!("/{path}")));
    }
}

#[test]
fn test_non_utf8_body_falls_back() {
    let mut page = page(&layout("Início", ""));
    page.navigate_to(url("sobre.html"));
    let request = page.take_fetch_requests().remove(0);

    let outcome = page.complete_fetch(&request, Ok(Response::html(200, vec![0xff, 0xfe, 0x00])));
    assert!(matches!(outcome, NavigationOutcome::FellBack(NavigationError::Decode(_))));
}

#[test]
fn test_stale_completion_is_discarded() {
    let mut page = page(&layout("Início", "<h1>Bem-vindo</h1>"));
    page.click(link(&page, "sobre.html"));
    page.click(link(&page, "cadastro.html"));
    let requests = page.take_fetch_requests();
    assert_eq!(requests.len(), 2);

    let fetcher = site();
    let first = eco_net::Fetcher::fetch(&fetcher, &requests[0].url);
    let outcome = page.complete_fetch(&requests[0], first);
    assert!(matches!(outcome, NavigationOutcome::Superseded));
    assert_eq!(page.document().tree().text_content(sel(&page, "h1")), "Bem-vindo");
    assert!(page.full_navigation().is_none());

    let second = eco_net::Fetcher::fetch(&fetcher, &requests[1].url);
    assert!(matches!(page.complete_fetch(&requests[1], second), NavigationOutcome::Spliced));
    assert_eq!(page.url().path(), "/cadastro.html");
}

#[test]
fn test_back_refetches_without_pushing_history() {
    let mut session = open("index.html");
    let sobre = link(session.page(), "sobre.html");
    session.page_mut().click(sobre);
    session.settle().unwrap();

    assert!(session.page_mut().back());
    session.settle().unwrap();

    let page = session.page();
    assert_eq!(page.url().path(), "/index.html");
    assert_eq!(page.title(), "Início | EcoConsciência");
    assert_eq!(page.history().len(), 2);
    assert!(page.history().can_go_forward());
    assert_eq!(session.fetcher().request_count(), 3);

    assert!(session.page_mut().forward());
    session.settle().unwrap();
    assert_eq!(session.page().url().path(), "/sobre.html");
}

#[test]
fn test_repeated_swaps_reuse_document_slots() {
    let mut session = open("index.html");
    let mut live = Vec::new();
    let mut slots = Vec::new();

    for round in 0..6 {
        let target = if round % 2 == 0 { "sobre.html" } else { "index.html" };
        let anchor = link(session.page(), target);
        session.page_mut().click(anchor);
        session.settle().unwrap();

        let tree = session.page().document().tree();
        live.push(tree.len());
        slots.push(tree.slot_count());
    }

    assert_eq!(session.full_loads(), 1);
    assert_eq!(live[0], live[2]);
    assert_eq!(live[1], live[5]);
    assert!(slots.iter().all(|&n| n == slots[0]), "slots grew: {slots:?}");
}

#[test]
fn test_swapped_form_is_interactive() {
    let mut session = open("index.html");
    let cadastro = link(session.page(), "cadastro.html");
    session.page_mut().click(cadastro);
    session.settle().unwrap();

    let page = session.page_mut();
    let cpf = id(page, "cpf");
    page.type_into(cpf, "12345678901");
    assert_eq!(value(page, "cpf"), "123.456.789-01");

    fill_valid(page);
    let report = submit(page);
    assert!(report.is_valid());
    assert_eq!(page.notices(), &[PageNotice::RegistrationAccepted]);
}

#[test]
fn test_route_change_closes_menu() {
    let mut session = open("index.html");
    let toggle = sel(session.page(), ".menu-toggle");
    session.page_mut().click(toggle);
    let sobre = link(session.page(), "sobre.html");
    session.page_mut().click(sobre);
    session.page_mut().click(toggle);
    assert!(is_open_menu(session.page()));

    session.settle().unwrap();
    assert!(!is_open_menu(session.page()));
}

#[test]
fn test_missing_title_uses_default() {
    let mut session = open("index.html");
    session.page_mut().navigate_to(url("sem-titulo.html"));
    session.settle().unwrap();

    assert_eq!(session.page().title(), "EcoConsciência");
    assert_eq!(session.full_loads(), 1);
}

#[test]
fn test_links_not_intercepted() {
    let mut page = page(&layout(
        "Início",
        r##"<a href="#topo">Topo</a><a id="nova" href="sobre.html" target="_blank">Nova aba</a><a id="pdf" href="guia.pdf" download>Guia</a>"##,
    ));

    page.click(link(&page, "#topo"));
    page.click(id(&page, "nova"));
    page.click(id(&page, "pdf"));
    let external = page.click(link(&page, "https://example.org/"));

    assert_eq!(page.pending_fetches(), 0);
    assert!(!external.is_default_prevented());
    assert_eq!(page.full_navigation().map(|u| u.as_str()), Some("https://example.org/"));
}

#[test]
fn test_named_target_leaves_current_page_alone() {
    let mut page = page(&layout(
        "Início",
        r#"<a id="janela" href="sobre.html" target="janela">Janela</a><a id="propria" href="cadastro.html" target="_self">Aqui</a>"#,
    ));

    let named = page.click(id(&page, "janela"));
    assert!(!named.is_default_prevented());
    assert_eq!(page.pending_fetches(), 0);
    assert!(page.full_navigation().is_none());

    let same = page.click(id(&page, "propria"));
    assert!(same.is_default_prevented());
    assert_eq!(page.pending_fetches(), 1);
}

#[test]
fn test_prevented_click_ignored() {
    let mut page = page(&layout("Início", ""));
    let mut event = UiEvent::click(link(&page, "sobre.html"));
    event.prevent_default();

    page.dispatch(event);
    assert_eq!(page.pending_fetches(), 0);
    assert!(page.full_navigation().is_none());
}

#[test]
fn test_custom_region_selector() {
    let config = SiteConfig::from_toml_str(r##"content_regions = ["#conteudo"]"##).unwrap();
    let fetcher = MemoryFetcher::new()
        .page("/a.html", r#"<title>A</title><a href="b.html">B</a><section id="conteudo">A</section>"#)
        .page("/b.html", r#"<title>B</title><section id="conteudo">B</section>"#);
    let mut session = Session::open(fetcher, url("a.html"), Box::new(MemoryStorage::new()), config).unwrap();

    let b = link(session.page(), "b.html");
    session.page_mut().click(b);
    session.settle().unwrap();

    assert_eq!(session.page().document().tree().text_content(sel(session.page(), "#conteudo")), "B");
    assert_eq!(session.full_loads(), 1);
}
