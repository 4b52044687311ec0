//! A2UI Standard Catalog
//!
//! The standard component set every renderer is expected to support.

use super::catalog::{Catalog, ComponentApi};
use super::schema::{CommonType, Schema};

/// Catalog id of the standard catalog
pub const STANDARD_CATALOG_ID: &str = "https://a2ui.org/specification/v0_9/standard_catalog.json";

/// Names of the standard components, in catalog order
pub const STANDARD_COMPONENTS: [&str; 18] = [
    "Text",
    "Image",
    "Icon",
    "Video",
    "AudioPlayer",
    "Row",
    "Column",
    "List",
    "Card",
    "Tabs",
    "Modal",
    "Divider",
    "Button",
    "CheckBox",
    "TextField",
    "DateTimeInput",
    "ChoicePicker",
    "Slider",
];

fn dynamic_string(description: &str) -> Schema {
    Schema::common(CommonType::DynamicString).describe(description)
}

fn component_id(description: &str) -> Schema {
    Schema::common(CommonType::ComponentId).describe(description)
}

fn children() -> Schema {
    Schema::common(CommonType::ChildList)
        .describe("Defines the children. Use an array of ids for a fixed set, or a template to build one child per item of a data model list.")
}

fn checks() -> Schema {
    Schema::array(Schema::common(CommonType::CheckRule))
        .optional()
        .describe("A list of checks to perform.")
}

fn justify() -> Schema {
    Schema::enumeration([
        "start",
        "center",
        "end",
        "spaceBetween",
        "spaceAround",
        "spaceEvenly",
        "stretch",
    ])
    .optional()
    .describe("Defines the arrangement of children along the main axis.")
}

fn align() -> Schema {
    Schema::enumeration(["start", "center", "end", "stretch"])
        .optional()
        .describe("Defines the alignment of children along the cross axis.")
}

/// Append the properties shared by every standard component.
fn common(api: ComponentApi) -> ComponentApi {
    api.property(
        "weight",
        Schema::common(CommonType::Weight).optional(),
    )
}

/// Build the standard catalog.
pub fn standard_catalog() -> Catalog {
    let components = [
        ComponentApi::new("Text")
            .describe("Displays text content.")
            .property("text", dynamic_string("The text content to display. Simple Markdown is supported."))
            .property(
                "variant",
                Schema::enumeration(["h1", "h2", "h3", "h4", "h5", "caption", "body"])
                    .optional()
                    .describe("A hint for the base text style."),
            ),
        ComponentApi::new("Image")
            .describe("Displays an image.")
            .property("url", dynamic_string("The URL of the image to display."))
            .property(
                "fit",
                Schema::enumeration(["contain", "cover", "fill", "none", "scale-down"])
                    .optional()
                    .describe("Specifies how the image should be resized to fit its container."),
            )
            .property(
                "variant",
                Schema::enumeration([
                    "icon",
                    "avatar",
                    "smallFeature",
                    "mediumFeature",
                    "largeFeature",
                    "header",
                ])
                .optional()
                .describe("A hint for the image size and style."),
            ),
        ComponentApi::new("Icon")
            .describe("Displays an icon from the standard icon set.")
            .property("name", dynamic_string("The name of the icon to display.")),
        ComponentApi::new("Video")
            .describe("Plays a video.")
            .property("url", dynamic_string("The URL of the video to play.")),
        ComponentApi::new("AudioPlayer")
            .describe("Plays an audio clip.")
            .property("url", dynamic_string("The URL of the audio to play."))
            .property(
                "description",
                dynamic_string("A description of the audio, such as a title or summary.").optional(),
            ),
        ComponentApi::new("Row")
            .describe("Arranges children horizontally.")
            .property("children", children())
            .property("justify", justify())
            .property("align", align()),
        ComponentApi::new("Column")
            .describe("Arranges children vertically.")
            .property("children", children())
            .property("justify", justify())
            .property("align", align()),
        ComponentApi::new("List")
            .describe("A scrollable list of children.")
            .property("children", children())
            .property(
                "direction",
                Schema::enumeration(["vertical", "horizontal"])
                    .optional()
                    .describe("The direction in which the list items are laid out."),
            )
            .property("align", align()),
        ComponentApi::new("Card")
            .describe("A container that visually groups its child.")
            .property("child", component_id("The ID of the component to render inside the card.")),
        ComponentApi::new("Tabs")
            .describe("A set of tabs, each showing one child.")
            .property(
                "tabs",
                Schema::array(Schema::object([
                    ("title", dynamic_string("The tab title.")),
                    ("child", component_id("The ID of the component shown for this tab.")),
                ]))
                .describe("The tabs to display."),
            ),
        ComponentApi::new("Modal")
            .describe("A dialog opened by a trigger component.")
            .property("trigger", component_id("The ID of the component that opens the modal."))
            .property("content", component_id("The ID of the component shown inside the modal.")),
        ComponentApi::new("Divider")
            .describe("A dividing line.")
            .property(
                "axis",
                Schema::enumeration(["horizontal", "vertical"])
                    .optional()
                    .describe("The orientation of the divider."),
            ),
        ComponentApi::new("Button")
            .describe("A clickable button that triggers an action.")
            .property("child", component_id("The ID of the component to display inside the button."))
            .property(
                "action",
                Schema::common(CommonType::Action).describe("The action performed when the button is clicked."),
            )
            .property(
                "variant",
                Schema::enumeration(["primary", "borderless"])
                    .optional()
                    .describe("A hint for the button style."),
            )
            .property("checks", checks()),
        ComponentApi::new("CheckBox")
            .describe("A labeled checkbox bound to a boolean.")
            .property("label", dynamic_string("The text displayed next to the checkbox."))
            .property(
                "value",
                Schema::common(CommonType::DynamicBoolean).describe("The checked state."),
            )
            .property("checks", checks()),
        ComponentApi::new("TextField")
            .describe("A text input field.")
            .property("label", dynamic_string("The text label for the input field."))
            .property("value", dynamic_string("The value of the text field.").optional())
            .property(
                "variant",
                Schema::enumeration(["longText", "number", "shortText", "obscured"])
                    .optional()
                    .describe("The type of input field to display."),
            )
            .property(
                "validationRegexp",
                Schema::string()
                    .optional()
                    .describe("A regular expression used for client-side validation of the input."),
            )
            .property("checks", checks()),
        ComponentApi::new("DateTimeInput")
            .describe("An input for dates and times.")
            .property("value", dynamic_string("The selected date and/or time, as an ISO 8601 string."))
            .property(
                "enableDate",
                Schema::common(CommonType::DynamicBoolean)
                    .optional()
                    .describe("Whether a date can be picked."),
            )
            .property(
                "enableTime",
                Schema::common(CommonType::DynamicBoolean)
                    .optional()
                    .describe("Whether a time can be picked."),
            )
            .property("min", dynamic_string("The earliest selectable date and/or time.").optional())
            .property("max", dynamic_string("The latest selectable date and/or time.").optional())
            .property("label", dynamic_string("The text label for the input.").optional())
            .property("checks", checks()),
        ComponentApi::new("ChoicePicker")
            .describe("A group of options to choose from.")
            .property("label", dynamic_string("The label for the group of options."))
            .property(
                "variant",
                Schema::enumeration(["multipleSelection", "mutuallyExclusive"])
                    .optional()
                    .describe("A hint for how the choice picker should be displayed and behave."),
            )
            .property(
                "options",
                Schema::array(Schema::object([
                    ("label", dynamic_string("The text to display for this option.")),
                    (
                        "value",
                        Schema::string().describe("The stable value associated with this option."),
                    ),
                ]))
                .describe("The list of available options to choose from."),
            )
            .property(
                "value",
                Schema::common(CommonType::DynamicStringList).describe(
                    "The list of currently selected values. This should be bound to a string array in the data model.",
                ),
            )
            .property("checks", checks()),
        ComponentApi::new("Slider")
            .describe("A slider for picking a number in a range.")
            .property("label", dynamic_string("The label for the slider.").optional())
            .property(
                "min",
                Schema::number().optional().describe("The minimum value of the slider."),
            )
            .property("max", Schema::number().describe("The maximum value of the slider."))
            .property(
                "value",
                Schema::common(CommonType::DynamicNumber).describe("The current value of the slider."),
            )
            .property("checks", checks()),
    ];

    components
        .into_iter()
        .map(common)
        .fold(Catalog::new(STANDARD_CATALOG_ID), Catalog::with_component)
}
