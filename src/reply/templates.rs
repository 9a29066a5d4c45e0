//! Reply templates keyed by (category, sub-intent).

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::pipeline::types::{Category, SubIntent};
use crate::reply::entities::ReplyContext;

/// Greeting used when no sender name was found.
pub const DEFAULT_NAME: &str = "tudo bem";

const PRODUCTIVE_STATUS_UPDATE: &str = "Olá {name},

Recebemos sua solicitação de atualização sobre o caso {ticket}. Já estamos verificando e retornaremos um novo status até {eta}.

Se tiver algum detalhe adicional (prints, horário do erro, mensagem exibida), por favor, responda a este e-mail.

{signature}";

const PRODUCTIVE_ATTACHMENT: &str = "Olá {name},

Agradecemos o envio do(s) arquivo(s). Encaminhamos para análise e retornaremos com os próximos passos até {eta}.

Caso falte algum documento, avisaremos por aqui.

{signature}";

const PRODUCTIVE_GENERIC: &str = "Olá {name},

Obrigado pelo contato. Estamos tratando sua solicitação e retornaremos até {eta}.

Se possível, compartilhe mais contexto (ex.: número do chamado, prints, horário do problema).

{signature}";

const UNPRODUCTIVE_GREETINGS: &str = "Olá {name},

Agradecemos a mensagem! Desejamos o mesmo a você. Caso precise de suporte, estamos à disposição.

{signature}";

const UNPRODUCTIVE_GENERIC: &str = "Olá {name},

Obrigado pela mensagem. Se houver alguma demanda específica, é só nos avisar por aqui.

{signature}";

static TEMPLATES: LazyLock<HashMap<(Category, Option<SubIntent>), &'static str>> =
    LazyLock::new(|| {
        HashMap::from([
            (
                (Category::Productive, Some(SubIntent::StatusUpdate)),
                PRODUCTIVE_STATUS_UPDATE,
            ),
            (
                (Category::Productive, Some(SubIntent::Attachment)),
                PRODUCTIVE_ATTACHMENT,
            ),
            ((Category::Productive, None), PRODUCTIVE_GENERIC),
            (
                (Category::Unproductive, Some(SubIntent::Greetings)),
                UNPRODUCTIVE_GREETINGS,
            ),
            ((Category::Unproductive, None), UNPRODUCTIVE_GENERIC),
        ])
    });

/// Template for (category, sub-intent), falling back to the category's generic template.
pub fn template_for(category: Category, sub_intent: Option<SubIntent>) -> &'static str {
    TEMPLATES
        .get(&(category, sub_intent))
        .or_else(|| TEMPLATES.get(&(category, None)))
        .copied()
        .unwrap_or(UNPRODUCTIVE_GENERIC)
}

/// Fill the selected template with the reply context.
pub fn render(category: Category, sub_intent: Option<SubIntent>, ctx: &ReplyContext) -> String {
    let name = ctx
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_NAME);

    template_for(category, sub_intent)
        .replace("{name}", name)
        .replace("{ticket}", &ctx.ticket)
        .replace("{eta}", &ctx.eta)
        .replace("{signature}", &ctx.signature)
}
