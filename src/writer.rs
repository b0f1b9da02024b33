//! NZB generation

use crate::Result;
use crate::nzb::Nzb;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::io::Cursor;

const NZB_NAMESPACE: &str = "http://www.newzbin.com/DTD/2003/nzb";
const NZB_DOCTYPE: &str =
    r#"nzb PUBLIC "-//newzBin//DTD NZB 1.1//EN" "http://www.newzbin.com/DTD/nzb/nzb-1.1.dtd""#;

impl Nzb {
    /// Generate an NZB 1.1 XML document
    ///
    /// Metadata is written in the order title, passwords, tags, category.
    /// Files, groups and segments keep their (sorted) order, so parsing the
    /// output gives back an equal `Nzb`.
    ///
    /// # Example
    /// ```
    /// let xml = r#"<nzb>
    ///   <head><meta type="title">Test File</meta></head>
    ///   <file poster="user@example.com" date="1234567890" subject="&quot;test.bin&quot; [1/1]">
    ///     <groups><group>alt.binaries.test</group></groups>
    ///     <segments><segment bytes="768000" number="1">part1of1@example.com</segment></segments>
    ///   </file>
    /// </nzb>"#;
    ///
    /// let nzb = nzb_rs::parse(xml).unwrap();
    /// let out = nzb.to_xml().unwrap();
    /// assert!(out.contains("<meta type=\"title\">Test File</meta>"));
    /// assert_eq!(nzb_rs::parse(&out).unwrap(), nzb);
    /// ```
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 2);

        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        writer.write_event(Event::DocType(BytesText::from_escaped(NZB_DOCTYPE)))?;

        let mut nzb_elem = BytesStart::new("nzb");
        nzb_elem.push_attribute(("xmlns", NZB_NAMESPACE));
        writer.write_event(Event::Start(nzb_elem))?;

        let meta = self.meta();
        if !meta.is_empty() {
            writer.write_event(Event::Start(BytesStart::new("head")))?;

            let entries = meta
                .title()
                .map(|t| ("title", t))
                .into_iter()
                .chain(meta.passwords().iter().map(|p| ("password", p.as_str())))
                .chain(meta.tags().iter().map(|t| ("tag", t.as_str())))
                .chain(meta.category().map(|c| ("category", c)));

            for (kind, value) in entries {
                let mut meta_elem = BytesStart::new("meta");
                meta_elem.push_attribute(("type", kind));
                writer.write_event(Event::Start(meta_elem))?;
                writer.write_event(Event::Text(BytesText::new(value)))?;
                writer.write_event(Event::End(BytesEnd::new("meta")))?;
            }

            writer.write_event(Event::End(BytesEnd::new("head")))?;
        }

        for file in self.files() {
            let mut file_elem = BytesStart::new("file");
            file_elem.push_attribute(("poster", file.poster()));
            file_elem.push_attribute(("date", file.timestamp().to_string().as_str()));
            file_elem.push_attribute(("subject", file.subject()));
            writer.write_event(Event::Start(file_elem))?;

            writer.write_event(Event::Start(BytesStart::new("groups")))?;
            for group in file.groups() {
                writer.write_event(Event::Start(BytesStart::new("group")))?;
                writer.write_event(Event::Text(BytesText::new(group)))?;
                writer.write_event(Event::End(BytesEnd::new("group")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("groups")))?;

            writer.write_event(Event::Start(BytesStart::new("segments")))?;
            for segment in file.segments() {
                let mut seg_elem = BytesStart::new("segment");
                seg_elem.push_attribute(("bytes", segment.size().to_string().as_str()));
                seg_elem.push_attribute(("number", segment.number().to_string().as_str()));
                writer.write_event(Event::Start(seg_elem))?;
                writer.write_event(Event::Text(BytesText::new(segment.message_id())))?;
                writer.write_event(Event::End(BytesEnd::new("segment")))?;
            }
            writer.write_event(Event::End(BytesEnd::new("segments")))?;

            writer.write_event(Event::End(BytesEnd::new("file")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("nzb")))?;

        let body = writer.into_inner().into_inner();
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}
