use super::ui;
use crate::client::HttpConversionClient;
use crate::config::AppConfig;
use crate::core::Currency;
use crate::widget::{Action, ConversionResult, Converter};
use anyhow::Result;
use comfy_table::Cell;

impl ConversionResult {
    pub fn display_as_table(&self) -> String {
        let mut table = ui::new_styled_table();

        table.set_header(vec![ui::header_cell("From"), ui::header_cell("To")]);
        table.add_row(vec![
            Cell::new(format!(
                "{}{:.2} {}",
                self.from.symbol(),
                self.amount,
                self.from.name()
            )),
            Cell::new(format!(
                "{}{:.6} {}",
                self.to.symbol(),
                self.converted_amount,
                self.to.name()
            )),
        ]);

        let mut output = format!(
            "{}\n\n",
            ui::style_text("Convert Fund", ui::StyleType::Title)
        );
        output.push_str(&table.to_string());
        output.push_str(&format!(
            "\n{}\n{}",
            ui::style_text(
                &format!("1 {} = {:.6} {}", self.from, self.rate, self.to),
                ui::StyleType::Subtle
            ),
            ui::style_text(
                &format!("1 {} = {:.6} {}", self.to, self.inverse_rate, self.from),
                ui::StyleType::Subtle
            ),
        ));

        output
    }
}

pub async fn run(
    config: &AppConfig,
    amount: Option<String>,
    from: Option<Currency>,
    to: Option<Currency>,
) -> Result<()> {
    let mut widget = Converter::new();

    if let Some(amount) = amount {
        widget.apply(Action::SetAmount(amount));
    }
    if let Some(from) = from {
        widget.apply(Action::SelectFrom(from));
    }
    if let Some(to) = to {
        if !widget.to_options().contains(&to) {
            anyhow::bail!("Target currency must differ from source currency");
        }
        widget.apply(Action::SelectTo(to));
    }

    let client = HttpConversionClient::new(&config.proxy_url);

    let pb = ui::new_spinner("Converting...");
    widget.submit(&client).await;
    pb.finish_and_clear();

    if let Some(error) = widget.error() {
        println!("{}", ui::style_text(error, ui::StyleType::Error));
        return Ok(());
    }

    if let Some(result) = widget.result() {
        println!("{}", result.display_as_table());
    }

    Ok(())
}
