use dioxus::prelude::*;

/// Generic modal shell: header row with a close button, body, and an optional
/// confirm button shown only when `confirm_text` is set.
#[component]
pub fn Modal(
    header: Element,
    on_dismiss: EventHandler<()>,
    on_confirm: EventHandler<()>,
    #[props(!optional)] confirm_text: Option<String>,
    #[props(into)] data_test_id: String,
    children: Element,
) -> Element {
    rsx! {
        div {
            class: "fixed inset-0 bg-black/50 backdrop-blur-sm flex items-center justify-center z-50 p-4",
            "data-testid": "{data_test_id}",
            onclick: move |_| on_dismiss.call(()),
            div {
                class: "panel w-full max-w-[450px] max-h-[90vh] overflow-y-auto",
                onclick: move |e| e.stop_propagation(),
                div { class: "flex justify-between items-center mb-6",
                    h2 { class: "text-xl font-bold", {header} }
                    button {
                        class: "modal-close",
                        onclick: move |_| on_dismiss.call(()),
                        "×"
                    }
                }
                {children}
                if let Some(text) = confirm_text {
                    div { class: "button-container",
                        button {
                            class: "btn btn-primary w-full",
                            onclick: move |_| on_confirm.call(()),
                            "{text}"
                        }
                    }
                }
            }
        }
    }
}
